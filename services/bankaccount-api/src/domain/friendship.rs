/// 友人関係（`Person`間の`has_friend`エッジ）
///
/// エッジ自体は有向だが、友人関係は順序なしのペアとして扱い、
/// 同じ2人の間には向きを問わず高々1本のエッジしか作らない。
use serde::{Deserialize, Serialize};

use super::person::Person;
use super::validation::{require_non_blank, ValidationError};

/// 友人関係のエッジラベル
pub const HAS_FRIEND_LABEL: &str = "has_friend";

/// 友人関係作成ペイロード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFriendship {
    pub person1_id: String,
    pub person2_id: String,
}

impl CreateFriendship {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("person1Id", &self.person1_id)?;
        require_non_blank("person2Id", &self.person2_id)?;
        if self.person1_id == self.person2_id {
            return Err(ValidationError::SelfFriendship);
        }
        Ok(())
    }
}

/// エッジで結ばれた人物のペア
///
/// `from`はエッジの始点、`to`は終点の人物。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Friendship {
    pub from: Person,
    pub to: Person,
}
