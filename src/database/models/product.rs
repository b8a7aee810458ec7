use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reference to an image that already lives in external storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub public_id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub user: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub rating: f64,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub key_features: String,
    pub specification: String,
    pub base_price: f64,
    pub discounted_price: f64,
    pub ratings: f64,
    pub images: Vec<ImageRef>,
    pub category: String,
    pub sub_category: String,
    pub sub_category2: String,
    pub size: String,
    pub stock: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_color: Option<String>,
    pub num_of_reviews: i32,
    pub reviews: Vec<Review>,
    pub created_at: DateTime<Utc>,
}

fn default_stock() -> i32 {
    1
}

/// Fields accepted when an admin creates a product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub key_features: String,
    pub specification: String,
    pub base_price: f64,
    pub discounted_price: f64,
    pub category: String,
    pub sub_category: String,
    #[serde(default)]
    pub sub_category2: String,
    pub size: String,
    #[serde(default = "default_stock")]
    pub stock: i32,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub available_color: Option<String>,
    #[serde(default)]
    pub images: Vec<ImageRef>,
}

/// Partial update. `images`, when present, replaces the whole list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub key_features: Option<String>,
    pub specification: Option<String>,
    pub base_price: Option<f64>,
    pub discounted_price: Option<f64>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub sub_category2: Option<String>,
    pub size: Option<String>,
    pub stock: Option<i32>,
    pub color: Option<String>,
    pub available_color: Option<String>,
    pub images: Option<Vec<ImageRef>>,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("name", self.name.trim()),
            ("description", self.description.as_str()),
            ("key_features", self.key_features.as_str()),
            ("specification", self.specification.as_str()),
            ("category", self.category.as_str()),
            ("sub_category", self.sub_category.as_str()),
            ("size", self.size.as_str()),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(format!("{} is required", field));
        }
        validate_prices(self.base_price, self.discounted_price)?;
        if self.stock < 0 {
            return Err("stock cannot be negative".to_string());
        }
        Ok(())
    }
}

fn set_required(target: &mut String, value: Option<String>, field: &str) -> Result<(), String> {
    match value {
        Some(v) if v.trim().is_empty() => Err(format!("{} cannot be empty", field)),
        Some(v) => {
            *target = v;
            Ok(())
        }
        None => Ok(()),
    }
}

fn validate_prices(base: f64, discounted: f64) -> Result<(), String> {
    if !base.is_finite() || base < 0.0 || !discounted.is_finite() || discounted < 0.0 {
        return Err("prices must be non-negative numbers".to_string());
    }
    Ok(())
}

impl Product {
    pub fn from_new(new: NewProduct) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: new.name.trim().to_string(),
            description: new.description,
            key_features: new.key_features,
            specification: new.specification,
            base_price: new.base_price,
            discounted_price: new.discounted_price,
            ratings: 0.0,
            images: new.images,
            category: new.category,
            sub_category: new.sub_category,
            sub_category2: new.sub_category2,
            size: new.size,
            stock: new.stock,
            color: new.color,
            available_color: new.available_color,
            num_of_reviews: 0,
            reviews: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn apply(&mut self, patch: ProductPatch) -> Result<(), String> {
        set_required(&mut self.name, patch.name.map(|n| n.trim().to_string()), "name")?;
        set_required(&mut self.description, patch.description, "description")?;
        set_required(&mut self.key_features, patch.key_features, "key_features")?;
        set_required(&mut self.specification, patch.specification, "specification")?;
        set_required(&mut self.category, patch.category, "category")?;
        set_required(&mut self.sub_category, patch.sub_category, "sub_category")?;
        set_required(&mut self.size, patch.size, "size")?;

        let base = patch.base_price.unwrap_or(self.base_price);
        let discounted = patch.discounted_price.unwrap_or(self.discounted_price);
        validate_prices(base, discounted)?;
        self.base_price = base;
        self.discounted_price = discounted;

        if let Some(stock) = patch.stock {
            if stock < 0 {
                return Err("stock cannot be negative".to_string());
            }
            self.stock = stock;
        }
        if let Some(v) = patch.sub_category2 {
            self.sub_category2 = v;
        }
        if patch.color.is_some() {
            self.color = patch.color;
        }
        if patch.available_color.is_some() {
            self.available_color = patch.available_color;
        }
        if let Some(images) = patch.images {
            self.images = images;
        }
        Ok(())
    }

    /// Replaces the rating and comment of an existing review by the same user,
    /// or appends a new one.
    pub fn upsert_review(&mut self, review: Review) {
        match self.reviews.iter_mut().find(|r| r.user == review.user) {
            Some(existing) => {
                existing.rating = review.rating;
                existing.comment = review.comment;
            }
            None => self.reviews.push(review),
        }
        self.recompute_ratings();
    }

    pub fn remove_review(&mut self, review_id: Uuid) -> bool {
        let before = self.reviews.len();
        self.reviews.retain(|r| r.id != review_id);
        let removed = self.reviews.len() != before;
        if removed {
            self.recompute_ratings();
        }
        removed
    }

    fn recompute_ratings(&mut self) {
        self.num_of_reviews = self.reviews.len() as i32;
        self.ratings = if self.reviews.is_empty() {
            0.0
        } else {
            self.reviews.iter().map(|r| r.rating).sum::<f64>() / self.reviews.len() as f64
        };
    }
}

/// Search criteria for the uncached product listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    pub keyword: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "price[gte]")]
    pub price_gte: Option<f64>,
    #[serde(rename = "price[lte]")]
    pub price_lte: Option<f64>,
    pub page: Option<u32>,
}

impl ProductQuery {
    /// True when no criterion is set, i.e. the request asks for the full catalog.
    pub fn is_unfiltered(&self) -> bool {
        self.keyword.is_none()
            && self.category.is_none()
            && self.price_gte.is_none()
            && self.price_lte.is_none()
            && self.page.is_none()
    }

    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn matches(&self, product: &Product) -> bool {
        if let Some(keyword) = self.keyword() {
            if !product.name.to_lowercase().contains(&keyword.to_lowercase()) {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if &product.category != category {
                return false;
            }
        }
        if let Some(min) = self.price_gte {
            if product.discounted_price < min {
                return false;
            }
        }
        if let Some(max) = self.price_lte {
            if product.discounted_price > max {
                return false;
            }
        }
        true
    }
}

/// One page of search results plus the number of matches before paging.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub filtered_count: usize,
}
