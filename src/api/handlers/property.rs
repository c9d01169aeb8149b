use axum::{extract::{Path, Query}, http::StatusCode, response::IntoResponse, Json};
use sqlx::types::Json as JsonColumn;
use tracing::info;
use crate::api::dtos::{
    requests::{CreatePropertyRequest, UpdatePropertyRequest},
    responses::Paginated,
};
use crate::api::extractors::auth::TenantUser;
use crate::domain::models::property::{Property, PropertyFilter};
use crate::domain::ports::TenantStore;
use crate::domain::services::defaults::perms;
use crate::error::AppError;

pub async fn list_properties(
    auth: TenantUser,
    Query(filter): Query<PropertyFilter>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::PROPERTIES_READ)?;
    let (data, total) = auth.ctx.store.properties.list(&filter).await?;
    Ok(Json(Paginated {
        data,
        total,
        page: filter.page.unwrap_or(1).max(1),
        per_page: filter.limit(),
    }))
}

pub async fn get_property(
    auth: TenantUser,
    Path(property_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::PROPERTIES_READ)?;
    Ok(Json(load(&auth.ctx.store, &property_id).await?))
}

pub async fn create_property(
    auth: TenantUser,
    Json(payload): Json<CreatePropertyRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::PROPERTIES_WRITE)?;
    payload.validate()?;
    let store = &auth.ctx.store;

    let limits = auth.ctx.tenant.plan.limits();
    if !limits.allows_another_listing(store.properties.count().await?) {
        return Err(AppError::Forbidden(format!(
            "The {} plan allows at most {} listings. Upgrade to add more.",
            limits.plan,
            limits.max_listings.unwrap_or_default()
        )));
    }
    if let Some(agent_id) = &payload.agent_id {
        ensure_agent(store, agent_id).await?;
    }

    let mut property = Property::new(
        payload.title.trim().to_string(),
        payload.property_type,
        payload.listing_type,
        payload.price,
        payload.city.trim().to_string(),
    );
    property.description = payload.description;
    property.address = payload.address;
    if let Some(currency) = payload.currency {
        property.currency = currency.to_uppercase();
    }
    property.bedrooms = payload.bedrooms;
    property.bathrooms = payload.bathrooms;
    property.area_sqm = payload.area_sqm;
    property.images = JsonColumn(payload.images);
    if let Some(status) = payload.status {
        property.status = status;
    }
    property.is_published = payload.is_published;
    property.is_featured = payload.is_featured;
    property.agent_id = payload.agent_id;

    let created = store.properties.create(&property).await?;
    info!(property_id = %created.id, "Created property listing");
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_property(
    auth: TenantUser,
    Path(property_id): Path<String>,
    Json(payload): Json<UpdatePropertyRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::PROPERTIES_WRITE)?;
    payload.validate()?;
    let store = &auth.ctx.store;
    let mut property = load(store, &property_id).await?;

    if let Some(title) = payload.title.filter(|t| !t.trim().is_empty()) { property.title = title.trim().to_string(); }
    if let Some(description) = payload.description { property.description = description; }
    if let Some(property_type) = payload.property_type { property.property_type = property_type; }
    if let Some(listing_type) = payload.listing_type { property.listing_type = listing_type; }
    if let Some(price) = payload.price { property.price = price; }
    if let Some(currency) = payload.currency { property.currency = currency.to_uppercase(); }
    if let Some(address) = payload.address { property.address = address; }
    if let Some(city) = payload.city.filter(|c| !c.trim().is_empty()) { property.city = city.trim().to_string(); }
    if payload.bedrooms.is_some() { property.bedrooms = payload.bedrooms; }
    if payload.bathrooms.is_some() { property.bathrooms = payload.bathrooms; }
    if payload.area_sqm.is_some() { property.area_sqm = payload.area_sqm; }
    if let Some(images) = payload.images { property.images = JsonColumn(images); }
    if let Some(status) = payload.status { property.status = status; }
    if let Some(is_published) = payload.is_published { property.is_published = is_published; }
    if let Some(is_featured) = payload.is_featured { property.is_featured = is_featured; }
    if let Some(agent_id) = payload.agent_id {
        if agent_id.is_empty() {
            property.agent_id = None;
        } else {
            ensure_agent(store, &agent_id).await?;
            property.agent_id = Some(agent_id);
        }
    }

    let updated = store.properties.update(&property).await?;
    info!(property_id = %updated.id, "Updated property listing");
    Ok(Json(updated))
}

pub async fn delete_property(
    auth: TenantUser,
    Path(property_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    auth.require(perms::PROPERTIES_WRITE)?;
    let store = &auth.ctx.store;
    load(store, &property_id).await?;
    store.properties.delete(&property_id).await?;
    info!(property_id = %property_id, "Deleted property listing");
    Ok(StatusCode::NO_CONTENT)
}

async fn load(store: &TenantStore, id: &str) -> Result<Property, AppError> {
    store.properties.find_by_id(id).await?
        .ok_or_else(|| AppError::NotFound("Property not found".into()))
}

async fn ensure_agent(store: &TenantStore, agent_id: &str) -> Result<(), AppError> {
    store.agents.find_by_id(agent_id).await?
        .ok_or_else(|| AppError::Validation("Agent does not exist".into()))?;
    Ok(())
}
