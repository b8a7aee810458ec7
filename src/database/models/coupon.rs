use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coupon {
    pub id: Uuid,
    pub code: String,
    pub discount_percent: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewCoupon {
    pub code: String,
    pub discount_percent: i32,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Coupon {
    pub fn create(new: NewCoupon) -> Result<Self, String> {
        let code = new.code.trim().to_uppercase();
        if code.is_empty() {
            return Err("coupon code is required".to_string());
        }
        if !(1..=100).contains(&new.discount_percent) {
            return Err("discount_percent must be between 1 and 100".to_string());
        }
        Ok(Self {
            id: Uuid::new_v4(),
            code,
            discount_percent: new.discount_percent,
            expires_at: new.expires_at,
            created_at: Utc::now(),
        })
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Discount for `amount`, rounded to two decimals.
    pub fn discount_for(&self, amount: f64) -> f64 {
        (amount * f64::from(self.discount_percent) / 100.0 * 100.0).round() / 100.0
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn create_uppercases_and_checks_range() {
        let coupon = Coupon::create(NewCoupon {
            code: " summer10 ".into(),
            discount_percent: 10,
            expires_at: None,
        })
        .unwrap();
        assert_eq!(coupon.code, "SUMMER10");

        assert!(
            Coupon::create(NewCoupon {
                code: "X".into(),
                discount_percent: 0,
                expires_at: None,
            })
            .is_err()
        );
    }

    #[test]
    fn discount_and_expiry() {
        let now = Utc::now();
        let coupon = Coupon::create(NewCoupon {
            code: "HALF".into(),
            discount_percent: 15,
            expires_at: Some(now + Duration::hours(1)),
        })
        .unwrap();
        assert_eq!(coupon.discount_for(199.99), 30.0);
        assert!(!coupon.is_expired_at(now));
        assert!(coupon.is_expired_at(now + Duration::hours(2)));
    }
}
