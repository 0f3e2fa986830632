use crate::{AnyStore, dao::Pet};
use std::future::Future;

pub trait PetStore: Send + Sync + 'static {
    /// Every pet, ordered by id.
    fn find_all_pets(&self) -> impl Future<Output = Result<Vec<Pet>, sqlx::Error>> + Send;
}

impl PetStore for AnyStore {
    async fn find_all_pets(&self) -> Result<Vec<Pet>, sqlx::Error> {
        let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, name FROM pets ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(id, name)| Pet { id, name }).collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn seeded_pets_are_listed_in_id_order() {
        let store = AnyStore::connect("sqlite::memory:").await.unwrap();
        let pets = store.find_all_pets().await.unwrap();
        let names: Vec<&str> = pets.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Whiskers", "Rex", "Bubbles"]);
        assert!(pets.windows(2).all(|w| w[0].id < w[1].id));
    }
}
