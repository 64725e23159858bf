use url::Url;

pub mod markdown;

/// 预览文本的最大字符数
pub const TEASER_LENGTH: usize = 200;

/// 从标题生成 URL 友好的别名
pub fn slugify(text: &str) -> String {
    slug::slugify(text)
}

/// 截取前 `max_chars` 个字符（按字符而不是字节，也不考虑单词边界）
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// 确保路径以斜杠结尾
pub fn ensure_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

/// 由 media_url 和图片名拼出图片地址
///
/// media_url 可以是绝对 URL（如 CDN），也可以是站内路径（如 `/media/`）。
pub fn media_url_for(media_url: &str, image: &str) -> String {
    let base = ensure_trailing_slash(media_url);
    let image = image.trim_start_matches('/');

    match Url::parse(&base).and_then(|base| base.join(image)) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{}{}", base, image),
    }
}
