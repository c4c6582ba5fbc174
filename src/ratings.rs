//! Rating aggregation for tours.
//!
//! `ratings_quantity` and `ratings_average` on a tour are derived state,
//! recomputed here from the review table and written back in a single atomic
//! update. Request handlers never write these fields directly.
//!
//! [`recompute`] is invoked explicitly by every review mutation path, after
//! the mutation has committed. It is idempotent: recomputing twice over the
//! same review set yields the same stored values, so concurrent reviews of
//! one tour converge once the last pending recompute lands.

use sqlx::PgPool;
use tracing::instrument;

use crate::{
    db::handlers::{Reviews, Tours},
    errors::{Error, Result},
    types::{abbrev_uuid, TourId},
};

/// Aggregate shown for a tour that has no reviews.
pub const DEFAULT_RATING: f64 = 4.5;

/// Round a mean rating to one decimal place (half away from zero).
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Recompute a tour's review count and mean rating and store both in one
/// update. A tour whose last review was removed goes back to the default
/// (count 0, average 4.5) rather than keeping stale values.
#[instrument(skip(db), fields(tour_id = %abbrev_uuid(&tour_id)), err)]
pub async fn recompute(db: &PgPool, tour_id: TourId) -> Result<()> {
    let mut conn = db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let (count, mean) = Reviews::new(&mut conn).rating_stats(tour_id).await?;

    let (quantity, average) = match mean {
        Some(mean) if count > 0 => (count as i32, round_to_tenth(mean)),
        _ => (0, DEFAULT_RATING),
    };

    let updated = Tours::new(&mut conn).set_rating_stats(tour_id, quantity, average).await?;
    if !updated {
        // Tour was deleted between the mutation and the recompute; nothing to write
        tracing::debug!("skipping rating recompute for missing tour");
    }

    Ok(())
}
