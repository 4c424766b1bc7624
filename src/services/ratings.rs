use crate::models::instructor::{Instructor, Review};

/// Mean review rating, or 0 when there are no reviews.
pub fn average_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    reviews.iter().map(|r| r.rating).sum::<f64>() / reviews.len() as f64
}

/// Highest average first. Ties keep their incoming order.
pub fn sort_by_average_rating(instructors: &mut [Instructor]) {
    instructors.sort_by(|a, b| {
        average_rating(&b.reviews)
            .partial_cmp(&average_rating(&a.reviews))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

pub fn filter_by_language(instructors: Vec<Instructor>, language: &str) -> Vec<Instructor> {
    instructors
        .into_iter()
        .filter(|i| i.languages.iter().any(|l| l == language))
        .collect()
}
