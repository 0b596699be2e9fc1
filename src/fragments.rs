//! Server-rendered HTML pages and fragments, built as plain strings.
//! Every dynamic value is escaped here; remote page metadata in particular
//! must never reach the browser unescaped.

use crate::models::Bookmark;

pub fn html_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Host portion of a URL, for compact display next to a bookmark title.
pub fn domain_of(url: &str) -> &str {
    let rest = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    rest.split(['/', '?', '#']).next().unwrap_or_default()
}

pub fn login_page(error: Option<&str>) -> String {
    let error_html = match error {
        Some(message) => format!("<p class=\"error\">{}</p>\n    ", html_escape(message)),
        None => String::new(),
    };

    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head><title>Login - Bookmarks</title></head>\n\
         <body>\n\
           <h1>Bookmarks</h1>\n\
           {error_html}<form method=\"post\" action=\"/login\">\n\
             <label>Username <input type=\"text\" name=\"username\" required></label>\n\
             <label>Password <input type=\"password\" name=\"password\" required></label>\n\
             <button type=\"submit\">Log in</button>\n\
           </form>\n\
         </body>\n\
         </html>\n"
    )
}

pub fn index_page(username: &str, bookmarks: &[Bookmark]) -> String {
    let items: String = bookmarks.iter().map(|b| bookmark_item(b)).collect();

    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head><title>Bookmarks</title></head>\n\
         <body>\n\
           <header>\n\
             <h1>Bookmarks</h1>\n\
             <span>{username}</span>\n\
             <form method=\"post\" action=\"/logout\"><button type=\"submit\">Log out</button></form>\n\
           </header>\n\
           <form method=\"post\" action=\"/api/bookmarks\">\n\
             <input type=\"url\" name=\"url\" placeholder=\"https://\" required>\n\
             <input type=\"text\" name=\"title\" placeholder=\"Title\">\n\
             <input type=\"text\" name=\"description\" placeholder=\"Description\">\n\
             <input type=\"text\" name=\"tags\" placeholder=\"tags, comma, separated\">\n\
             <button type=\"submit\">Add bookmark</button>\n\
           </form>\n\
           <ul class=\"bookmarks\">\n{items}</ul>\n\
         </body>\n\
         </html>\n",
        username = html_escape(username),
    )
}

pub fn bookmark_item(bookmark: &Bookmark) -> String {
    let url = html_escape(&bookmark.url);
    let label = match bookmark.title.as_deref() {
        Some(title) if !title.is_empty() => html_escape(title),
        _ => url.clone(),
    };
    let domain = html_escape(domain_of(&bookmark.url));

    let tags: String = bookmark
        .tags
        .iter()
        .map(|tag| format!("<span class=\"tag\">{}</span>", html_escape(&tag.name)))
        .collect();

    let description = match bookmark.description.as_deref() {
        Some(text) if !text.is_empty() => {
            format!("<p class=\"description\">{}</p>", html_escape(text))
        }
        _ => String::new(),
    };

    format!(
        "  <li class=\"bookmark\" data-id=\"{id}\">\n\
         \x20   <a href=\"{url}\">{label}</a>\n\
         \x20   <span class=\"domain\">{domain}</span>\n\
         \x20   {tags}{description}\n\
         \x20   <form method=\"post\" action=\"/api/bookmarks/{id}/delete\"><button type=\"submit\">Delete</button></form>\n\
         \x20 </li>\n",
        id = bookmark.id,
    )
}

/// Edit form fragment for one bookmark, prefilled with its current fields.
/// Submitting rewrites the whole tag set from the `new_tags` input.
pub fn edit_form(bookmark: &Bookmark) -> String {
    let tags_value = bookmark
        .tags
        .iter()
        .map(|tag| tag.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "<form class=\"edit\" method=\"post\" action=\"/api/bookmarks/{id}/update\">\n\
         \x20 <input type=\"url\" name=\"new_url\" value=\"{url}\">\n\
         \x20 <input type=\"text\" name=\"new_title\" value=\"{title}\">\n\
         \x20 <input type=\"text\" name=\"new_description\" value=\"{description}\">\n\
         \x20 <input type=\"text\" name=\"new_tags\" value=\"{tags}\">\n\
         \x20 <button type=\"submit\">Save</button>\n\
         </form>\n",
        id = bookmark.id,
        url = html_escape(&bookmark.url),
        title = html_escape(bookmark.title.as_deref().unwrap_or_default()),
        description = html_escape(bookmark.description.as_deref().unwrap_or_default()),
        tags = html_escape(&tags_value),
    )
}
