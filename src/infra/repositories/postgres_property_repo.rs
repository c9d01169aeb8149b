use crate::domain::{models::property::{Property, PropertyFilter}, ports::PropertyRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Postgres, PgPool};

pub struct PostgresPropertyRepo {
    pool: PgPool,
}

impl PostgresPropertyRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &PropertyFilter) {
    qb.push(" WHERE 1 = 1");
    if filter.published_only {
        qb.push(" AND is_published = TRUE");
    }
    if let Some(city) = &filter.city {
        qb.push(" AND LOWER(city) = LOWER(").push_bind(city.clone()).push(")");
    }
    if let Some(property_type) = &filter.property_type {
        qb.push(" AND property_type = ").push_bind(property_type.clone());
    }
    if let Some(listing_type) = &filter.listing_type {
        qb.push(" AND listing_type = ").push_bind(listing_type.clone());
    }
    if let Some(status) = &filter.status {
        qb.push(" AND status = ").push_bind(status.clone());
    }
    if let Some(min) = filter.min_price {
        qb.push(" AND price >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price {
        qb.push(" AND price <= ").push_bind(max);
    }
    if let Some(featured) = filter.featured {
        qb.push(" AND is_featured = ").push_bind(featured);
    }
}

#[async_trait]
impl PropertyRepository for PostgresPropertyRepo {
    async fn create(&self, property: &Property) -> Result<Property, AppError> {
        sqlx::query_as::<_, Property>(
            "INSERT INTO properties (id, title, description, property_type, listing_type, price, currency, address, city, bedrooms, bathrooms, area_sqm, images, status, is_published, is_featured, agent_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19) RETURNING *"
        )
            .bind(&property.id)
            .bind(&property.title)
            .bind(&property.description)
            .bind(&property.property_type)
            .bind(&property.listing_type)
            .bind(property.price)
            .bind(&property.currency)
            .bind(&property.address)
            .bind(&property.city)
            .bind(property.bedrooms)
            .bind(property.bathrooms)
            .bind(property.area_sqm)
            .bind(&property.images)
            .bind(&property.status)
            .bind(property.is_published)
            .bind(property.is_featured)
            .bind(&property.agent_id)
            .bind(property.created_at)
            .bind(property.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Property>, AppError> {
        sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, filter: &PropertyFilter) -> Result<(Vec<Property>, i64), AppError> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM properties");
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM properties");
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY is_featured DESC, created_at DESC LIMIT ")
            .push_bind(filter.limit())
            .push(" OFFSET ")
            .push_bind(filter.offset());

        let items = qb.build_query_as::<Property>().fetch_all(&self.pool).await?;
        Ok((items, total))
    }

    async fn update(&self, property: &Property) -> Result<Property, AppError> {
        sqlx::query_as::<_, Property>(
            "UPDATE properties SET title=$1, description=$2, property_type=$3, listing_type=$4, price=$5, currency=$6, address=$7, city=$8, bedrooms=$9, bathrooms=$10, area_sqm=$11, images=$12, status=$13, is_published=$14, is_featured=$15, agent_id=$16, updated_at=$17 \
             WHERE id=$18 RETURNING *"
        )
            .bind(&property.title)
            .bind(&property.description)
            .bind(&property.property_type)
            .bind(&property.listing_type)
            .bind(property.price)
            .bind(&property.currency)
            .bind(&property.address)
            .bind(&property.city)
            .bind(property.bedrooms)
            .bind(property.bathrooms)
            .bind(property.area_sqm)
            .bind(&property.images)
            .bind(&property.status)
            .bind(property.is_published)
            .bind(property.is_featured)
            .bind(&property.agent_id)
            .bind(Utc::now())
            .bind(&property.id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Property not found".into()))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }

    async fn count(&self) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM properties")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn count_published(&self) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM properties WHERE is_published = TRUE")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
