use crate::clock;
use crate::entries::repo::{EntrySource, FoodEntry, NewEntry};
use crate::nutrition::Macros;
use crate::state::AppState;

/// Resolve macros (unless all four were supplied) and append one entry for
/// the user. The resolver never fails, so the only error here is storage.
pub async fn log_entry(
    state: &AppState,
    user_id: i64,
    name: &str,
    quantity: &str,
    source: EntrySource,
    supplied: Option<Macros>,
) -> anyhow::Result<FoodEntry> {
    let macros = match supplied {
        Some(m) => m,
        None => state.resolver.resolve(name).await,
    };

    let new = NewEntry {
        name: name.to_string(),
        calories: Some(macros.calories),
        protein: Some(macros.protein),
        carbs: Some(macros.carbs),
        fat: Some(macros.fat),
        quantity: quantity.to_string(),
        source,
        created_at: clock::now_stamp(),
    };
    FoodEntry::insert(&state.db, user_id, &new).await
}
