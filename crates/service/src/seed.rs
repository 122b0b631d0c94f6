//! Demo catalogue for fresh installs.
use models::service::{self, NewService};
use models::user::{self, NewUser, Role};
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait};
use tracing::info;

use crate::errors::ServiceError;

pub const DEMO_PROVIDER_EMAIL: &str = "provider@example.com";

/// (name, category, description, location, price in cents, phone)
const SAMPLE_SERVICES: [(&str, &str, &str, &str, i64, &str); 16] = [
    ("Professional Plumbing Services", "Plumbing", "Expert plumbing repairs and installations for residential and commercial properties", "New York, NY", 8_500, "555-0101"),
    ("Expert Electrical Work", "Electrical", "Licensed electrician providing safe and efficient electrical services", "Los Angeles, CA", 9_500, "555-0102"),
    ("Deep Cleaning Services", "Cleaning", "Professional deep cleaning for homes and offices with eco-friendly products", "Chicago, IL", 6_500, "555-0103"),
    ("Custom Carpentry Work", "Carpentry", "Fine woodworking and custom carpentry for all your home renovation needs", "Houston, TX", 12_000, "555-0104"),
    ("Interior & Exterior Painting", "Painting", "High-quality painting services with premium paints and professional finish", "Phoenix, AZ", 7_500, "555-0105"),
    ("Landscape Design & Maintenance", "Landscaping", "Beautiful landscape design and ongoing maintenance for your outdoor space", "Miami, FL", 11_000, "555-0106"),
    ("HVAC Installation & Repair", "HVAC", "Professional heating, cooling, and ventilation system services", "Denver, CO", 15_000, "555-0107"),
    ("Water Damage Restoration", "Water Damage", "Emergency water damage repair and complete restoration services", "Seattle, WA", 20_000, "555-0108"),
    ("Premium Hair & Beauty Salon", "Hair & Beauty", "Professional hair styling, cutting, coloring, and beauty treatments", "Boston, MA", 6_500, "555-0109"),
    ("Professional Pet Grooming", "Pet Services", "Expert pet grooming, training, and boarding services for all breeds", "Austin, TX", 5_500, "555-0110"),
    ("Expert Tutoring Services", "Education", "Professional tutoring for all subjects and test preparation", "San Francisco, CA", 6_000, "555-0111"),
    ("Professional Photography Services", "Photography", "Event, portrait, and product photography with professional editing", "Portland, OR", 25_000, "555-0112"),
    ("Moving & Hauling Solutions", "Moving & Hauling", "Professional moving, packing, and item hauling services", "Atlanta, GA", 12_000, "555-0113"),
    ("Interior Design & Furniture Installation", "Furniture & Decor", "Professional interior design and furniture installation services", "Miami, FL", 9_500, "555-0114"),
    ("General Handyman Solutions", "General Handyman", "All-purpose handyman services for repairs and home maintenance", "Nashville, TN", 7_000, "555-0115"),
    ("Professional Locksmith Services", "Locksmith", "24/7 locksmith services for emergency lock repair and installation", "Philadelphia, PA", 8_500, "555-0116"),
];

/// Insert the demo provider and sample services when the catalogue is empty.
/// Returns how many services were inserted.
pub async fn seed_if_empty<C: ConnectionTrait>(db: &C) -> Result<usize, ServiceError> {
    let existing = service::Entity::find().count(db).await?;
    if existing > 0 {
        info!(existing, "seed skipped, catalogue not empty");
        return Ok(0);
    }

    let provider = match user::find_by_email(db, DEMO_PROVIDER_EMAIL).await? {
        Some(u) => u,
        None => {
            user::create(
                db,
                NewUser {
                    name: "Service Provider".into(),
                    email: DEMO_PROVIDER_EMAIL.into(),
                    role: Role::Business,
                    business_name: Some("Expert Services Co.".into()),
                    business_category: Some("Multi-Service".into()),
                    phone: None,
                },
            )
            .await?
        }
    };

    for (name, category, description, location, price_cents, phone) in SAMPLE_SERVICES {
        service::create(
            db,
            NewService {
                provider_id: provider.id,
                name: name.into(),
                category: category.into(),
                description: description.into(),
                price_cents,
                location: location.into(),
                phone: phone.into(),
                image: None,
            },
        )
        .await?;
    }
    info!(count = SAMPLE_SERVICES.len(), provider_id = %provider.id, "catalogue_seeded");
    Ok(SAMPLE_SERVICES.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn sample_rows_are_valid() {
        let names: HashSet<&str> = SAMPLE_SERVICES.iter().map(|s| s.0).collect();
        assert_eq!(names.len(), SAMPLE_SERVICES.len());
        for (name, category, description, location, price, phone) in SAMPLE_SERVICES {
            let input = NewService {
                provider_id: uuid::Uuid::nil(),
                name: name.into(),
                category: category.into(),
                description: description.into(),
                price_cents: price,
                location: location.into(),
                phone: phone.into(),
                image: None,
            };
            assert!(service::validate(&input).is_ok(), "{}", name);
        }
    }
}
