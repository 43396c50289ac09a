/// 人物（`Person`頂点）
///
/// 業務キー`personId`で一意に識別される。`personId`は作成時に採番され、
/// 以降の取得・更新・削除のキーとなる。
use serde::{Deserialize, Serialize};

use super::validation::{require_non_blank, validate_email, ValidationError};

/// グラフ上の頂点ラベル
pub const PERSON_LABEL: &str = "Person";

/// 業務キーのプロパティ名
pub const PERSON_ID_PROPERTY: &str = "personId";

/// 人物レコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    /// 業務キー（UUID v4）
    pub person_id: String,
    /// 氏名
    pub name: String,
    /// メールアドレス
    pub email: String,
}

/// 人物作成ペイロード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePerson {
    pub name: String,
    pub email: String,
}

impl CreatePerson {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("name", &self.name)?;
        require_non_blank("email", &self.email)?;
        validate_email(&self.email)
    }

    /// 採番済みの業務キーと組み合わせてレコードを作る
    pub fn into_person(self, person_id: String) -> Person {
        Person {
            person_id,
            name: self.name,
            email: self.email,
        }
    }
}

/// 人物更新ペイロード（部分更新）
///
/// 指定されなかったフィールドはシリアライズ時に省略され、既存値が維持される。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdatePerson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UpdatePerson {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            require_non_blank("name", name)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_person_serializes_camel_case() {
        let person = Person {
            person_id: "p-1".to_string(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
        };

        let value = serde_json::to_value(&person).unwrap();
        assert_eq!(
            value,
            json!({"personId": "p-1", "name": "Alice", "email": "alice@example.com"})
        );
    }

    #[test]
    fn test_person_deserializes_ignoring_extra_properties() {
        let value = json!({
            "personId": "p-1",
            "name": "Alice",
            "email": "alice@example.com",
            "nickname": "ally"
        });

        let person: Person = serde_json::from_value(value).unwrap();
        assert_eq!(person.person_id, "p-1");
    }

    #[test]
    fn test_create_person_validate() {
        let valid = CreatePerson {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
        };
        assert!(valid.validate().is_ok());

        let blank_name = CreatePerson {
            name: " ".to_string(),
            ..valid.clone()
        };
        assert_eq!(blank_name.validate(), Err(ValidationError::EmptyField("name")));

        let bad_email = CreatePerson {
            email: "alice".to_string(),
            ..valid
        };
        assert_eq!(
            bad_email.validate(),
            Err(ValidationError::InvalidEmail("alice".to_string()))
        );
    }

    #[test]
    fn test_update_person_omits_unset_fields() {
        let update = UpdatePerson {
            name: Some("Alicia".to_string()),
            email: None,
        };

        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value, json!({"name": "Alicia"}));
    }

    #[test]
    fn test_update_person_validates_only_supplied_fields() {
        assert!(UpdatePerson::default().validate().is_ok());

        let update = UpdatePerson {
            name: None,
            email: Some("not-an-email".to_string()),
        };
        assert!(update.validate().is_err());
    }
}
