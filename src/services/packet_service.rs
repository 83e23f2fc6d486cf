use crate::dto::admin_dto::{CreatePacketRequest, UpdatePacketRequest};
use crate::error::Result;
use crate::models::packet::Packet;
use crate::models::scale::ScaleBand;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::SqlitePool;
use uuid::Uuid;

#[derive(Clone)]
pub struct PacketService {
    pool: SqlitePool,
}

impl PacketService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Packet>> {
        let packets =
            sqlx::query_as::<_, Packet>("SELECT * FROM packets ORDER BY name COLLATE NOCASE")
                .fetch_all(&self.pool)
                .await?;
        Ok(packets)
    }

    pub async fn get(&self, id: Uuid) -> Result<Packet> {
        let packet = sqlx::query_as::<_, Packet>("SELECT * FROM packets WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(packet)
    }

    pub async fn create(&self, req: CreatePacketRequest) -> Result<Packet> {
        validate_scale(req.scoring_scale.as_deref())?;
        let now = Utc::now();
        let packet = sqlx::query_as::<_, Packet>(
            r#"
            INSERT INTO packets (id, name, description, scoring_scale, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(req.name.trim())
        .bind(req.description)
        .bind(req.scoring_scale.map(Json))
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(packet)
    }

    pub async fn update(&self, id: Uuid, req: UpdatePacketRequest) -> Result<Packet> {
        validate_scale(req.scoring_scale.as_deref())?;
        let current = self.get(id).await?;

        let name = req
            .name
            .as_deref()
            .map(str::trim)
            .unwrap_or(current.name.as_str())
            .to_string();
        let description = req.description.or(current.description);
        // An explicit empty list clears the custom scale.
        let scoring_scale = match req.scoring_scale {
            Some(scale) if scale.is_empty() => None,
            Some(scale) => Some(Json(scale)),
            None => current.scoring_scale,
        };

        let packet = sqlx::query_as::<_, Packet>(
            r#"
            UPDATE packets SET name = ?, description = ?, scoring_scale = ?, updated_at = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(scoring_scale)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(packet)
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM packets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(crate::error::Error::NotFound("packet not found".into()));
        }
        Ok(())
    }
}

fn validate_scale(scale: Option<&[ScaleBand]>) -> Result<()> {
    let Some(bands) = scale else {
        return Ok(());
    };
    for band in bands {
        if band.min > band.max {
            return Err(crate::error::Error::BadRequest(format!(
                "scale band '{}' has min {} greater than max {}",
                band.label, band.min, band.max
            )));
        }
        if band.label.trim().is_empty() {
            return Err(crate::error::Error::BadRequest(
                "scale bands need a non-empty label".into(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_inverted_band_bounds() {
        let bands = vec![ScaleBand {
            min: 5,
            max: 2,
            label: "Broken".into(),
            color: "#000000".into(),
            image: String::new(),
            large_text: String::new(),
        }];
        assert!(validate_scale(Some(&bands)).is_err());
    }

    #[test]
    fn accepts_absent_or_valid_scales() {
        assert!(validate_scale(None).is_ok());
        let bands = vec![ScaleBand {
            min: 0,
            max: 10,
            label: "Fine".into(),
            color: "#000000".into(),
            image: String::new(),
            large_text: String::new(),
        }];
        assert!(validate_scale(Some(&bands)).is_ok());
    }
}
