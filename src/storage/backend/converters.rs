use sea_orm::ActiveValue::Set;

use crate::storage::UrlStats;
use migration::entities::{url, url_stats};

/// 历史列表的行内分隔符（HTTP 头里不会出现换行）
const LIST_DELIMITER: char = '\n';

pub fn encode_list(values: &[String]) -> String {
    values.join(&LIST_DELIMITER.to_string())
}

/// 空字符串解码为空列表
pub fn decode_list(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(LIST_DELIMITER).map(str::to_string).collect()
}

pub fn model_to_stats(model: url_stats::Model) -> UrlStats {
    UrlStats {
        count: model.count.max(0) as u64,
        last_ips: decode_list(&model.last_ips),
        referrers: decode_list(&model.referrers),
        last_geo_location: model.last_geo_location,
    }
}

pub fn stats_to_active_model(alias: &str, stats: &UrlStats) -> url_stats::ActiveModel {
    url_stats::ActiveModel {
        short_url: Set(alias.to_string()),
        count: Set(i64::try_from(stats.count).unwrap_or(i64::MAX)),
        last_ips: Set(encode_list(&stats.last_ips)),
        referrers: Set(encode_list(&stats.referrers)),
        last_geo_location: Set(stats.last_geo_location.clone()),
    }
}

pub fn url_to_active_model(alias: &str, original_url: &str) -> url::ActiveModel {
    url::ActiveModel {
        short_url: Set(alias.to_string()),
        original_url: Set(original_url.to_string()),
    }
}
