//! Cache key builders.
//!
//! Key construction is the caller's responsibility; these helpers keep keys
//! collision-free and human-debuggable (`video:v42`, `videos:1:20:{...}`).

use serde_json::Value;

pub fn video(id: &str) -> String {
    format!("video:{id}")
}

pub fn video_list(page: u32, limit: u32, filters: Option<&Value>) -> String {
    let filter_str = filters.map(Value::to_string).unwrap_or_default();
    format!("videos:{page}:{limit}:{filter_str}")
}

pub fn creator(id: &str) -> String {
    format!("creator:{id}")
}

pub fn creator_videos(id: &str, page: u32) -> String {
    format!("creator:{id}:videos:{page}")
}

pub fn blog(id: &str) -> String {
    format!("blog:{id}")
}

pub fn blog_list(page: u32, limit: u32) -> String {
    format!("blogs:{page}:{limit}")
}

pub fn search(query: &str, kind: &str, page: u32) -> String {
    format!("search:{kind}:{query}:{page}")
}

pub fn user(id: &str) -> String {
    format!("user:{id}")
}

pub fn user_stats(id: &str) -> String {
    format!("user:{id}:stats")
}
