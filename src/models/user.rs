use serde::{Deserialize, Serialize};

/// 用户档案
///
/// 本地只保存一条记录，登录时创建，退出时删除
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub name: String,
    pub category: String,
    #[serde(deserialize_with = "deserialize_year")]
    pub year: String,
    /// 其余档案字段原样保留
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserInfo {
    pub fn new(name: impl Into<String>, category: impl Into<String>, year: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            year: year.into(),
            extra: serde_json::Map::new(),
        }
    }
}

// year 既可能是字符串也可能是整数
pub(crate) fn deserialize_year<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct YearVisitor;

    impl<'de> Visitor<'de> for YearVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or integer representing a year")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(YearVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_accepts_number_or_string() {
        let user: UserInfo =
            serde_json::from_str(r#"{"name":"Asha","category":"Engineering","year":2}"#).unwrap();
        assert_eq!(user.year, "2");

        let user: UserInfo =
            serde_json::from_str(r#"{"name":"Asha","category":"Engineering","year":"Second"}"#)
                .unwrap();
        assert_eq!(user.year, "Second");
    }

    #[test]
    fn test_extra_fields_survive_round_trip() {
        let json = r#"{"name":"Asha","category":"Medical","year":1,"email":"asha@example.com"}"#;
        let user: UserInfo = serde_json::from_str(json).unwrap();
        assert_eq!(user.extra.get("email").and_then(|v| v.as_str()), Some("asha@example.com"));

        let back: UserInfo = serde_json::from_str(&serde_json::to_string(&user).unwrap()).unwrap();
        assert_eq!(back, user);
    }
}
