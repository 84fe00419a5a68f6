use crate::entities::certificate_entity as cert;
use crate::error::AppResult;
use chrono::{DateTime, Utc};
use rand::Rng;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// `CERT-YYYYMMDD-XXXXXX`, suffix drawn from an alphabet without look-alike characters.
pub fn format_certificate_number(issued_at: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("CERT-{}-{}", issued_at.format("%Y%m%d"), suffix)
}

pub async fn generate_unique_certificate_number(pool: &DatabaseConnection) -> AppResult<String> {
    loop {
        let number = format_certificate_number(Utc::now());

        let exists = cert::Entity::find()
            .filter(cert::Column::CertificateNumber.eq(number.clone()))
            .count(pool)
            .await?;

        if exists == 0 {
            return Ok(number);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_certificate_number() {
        let at = Utc.with_ymd_and_hms(2025, 3, 9, 12, 0, 0).unwrap();
        let number = format_certificate_number(at);
        assert!(number.starts_with("CERT-20250309-"));
        assert_eq!(number.len(), "CERT-20250309-".len() + 6);
        assert!(
            number[14..]
                .bytes()
                .all(|b| ALPHABET.contains(&b))
        );
    }
}
