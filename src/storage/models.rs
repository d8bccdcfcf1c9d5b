use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// IP / Referer 历史保留条数
pub const HISTORY_LIMIT: usize = 5;

/// 拿不到客户端 IP 时记录的值
pub const UNKNOWN_IP: &str = "unknown";

/// 短码 -> 原始 URL 的快照（backup / flush / import 共用的格式）
pub type UrlMapping = BTreeMap<String, String>;

/// 单个短链接的访问统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlStats {
    pub count: u64,
    pub last_ips: Vec<String>,
    pub referrers: Vec<String>,
    pub last_geo_location: String,
}

impl UrlStats {
    /// 记录一次成功的跳转
    ///
    /// IP 每次都记录（允许重复，空值记为 [`UNKNOWN_IP`]），Referer 为空时跳过；
    /// 两者都只保留最近 [`HISTORY_LIMIT`] 条，最旧的先淘汰。地理位置直接覆盖。
    pub fn record_visit(&mut self, ip: &str, referrer: &str, geo_location: &str) {
        self.count = self.count.saturating_add(1);
        let ip = if ip.trim().is_empty() { UNKNOWN_IP } else { ip };
        push_bounded(&mut self.last_ips, sanitize(ip));
        if !referrer.is_empty() {
            push_bounded(&mut self.referrers, sanitize(referrer));
        }
        self.last_geo_location = geo_location.to_string();
    }
}

fn push_bounded(history: &mut Vec<String>, value: String) {
    history.push(value);
    while history.len() > HISTORY_LIMIT {
        history.remove(0);
    }
}

// 持久化时以换行分隔，值里不能再出现换行
fn sanitize(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

/// 同一时刻读取到的映射和统计
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlEntry {
    pub url: String,
    pub stats: UrlStats,
}

/// 导入结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub failed: Vec<String>,
}
