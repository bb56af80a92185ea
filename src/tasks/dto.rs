use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

/// Request body for task creation. Ownership comes from the verified token,
/// never from the payload.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub description: String,
    #[serde(default)]
    pub due_date: Option<OffsetDateTime>,
}

/// Partial update. Absent fields keep their stored value; `due_date` is
/// tri-state (absent = keep, null = clear, value = set).
#[derive(Debug, Default, Deserialize)]
pub struct TaskPatch {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<OffsetDateTime>>,
}

fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
}
