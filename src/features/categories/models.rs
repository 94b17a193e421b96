use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// カテゴリーデータモデル（正規化済み）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Option<String>,
    pub user_id: String,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// カテゴリー作成用DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryDto {
    pub user_id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serialization() {
        let category = Category {
            id: Some("cat-1".to_string()),
            user_id: "user-1".to_string(),
            name: "エンタメ".to_string(),
            created_at: None,
            updated_at: None,
        };

        let json = serde_json::to_string(&category).unwrap();
        assert!(json.contains("\"userId\":\"user-1\""));
        assert!(json.contains("\"name\":\"エンタメ\""));

        let deserialized: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, category);
    }

    #[test]
    fn test_create_dto_wire_shape() {
        let dto = CreateCategoryDto {
            user_id: "user-1".to_string(),
            name: "学習".to_string(),
        };

        let json = serde_json::to_value(&dto).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert!(obj.contains_key("userId"));
        assert!(obj.contains_key("name"));
    }
}
