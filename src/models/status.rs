/// 界面状态
///
/// 任意时刻只有一个状态处于激活
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppStatus {
    /// 未登录（注册页）
    Idle,
    /// 主面板
    Dashboard,
    /// 社区门户
    KmuPortal,
    /// 等待生成
    Loading,
    /// 答题中
    Quiz,
    /// 成绩页
    Result,
    /// 错误页
    Error,
}

impl AppStatus {
    /// 获取界面名称
    pub fn name(self) -> &'static str {
        match self {
            AppStatus::Idle => "注册",
            AppStatus::Dashboard => "主面板",
            AppStatus::KmuPortal => "社区门户",
            AppStatus::Loading => "生成中",
            AppStatus::Quiz => "答题",
            AppStatus::Result => "成绩",
            AppStatus::Error => "错误",
        }
    }
}

impl std::fmt::Display for AppStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 题目难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// 提示词中使用的名称
    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// 从字符串解析难度（忽略大小写）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "e" | "简单" => Some(Difficulty::Easy),
            "medium" | "m" | "normal" | "中等" => Some(Difficulty::Medium),
            "hard" | "h" | "困难" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_difficulty() {
        assert_eq!(Difficulty::parse("HARD"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::parse(" easy "), Some(Difficulty::Easy));
        assert_eq!(Difficulty::parse("中等"), Some(Difficulty::Medium));
        assert_eq!(Difficulty::parse("extreme"), None);
    }
}
