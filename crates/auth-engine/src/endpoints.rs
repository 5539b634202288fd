//! Paths of the blog API, relative to the configured base URL.

pub struct Endpoints;

impl Endpoints {
    pub const LOGIN: &'static str = "/api/login";
    pub const REGISTER: &'static str = "/api/register";
    pub const REFRESH: &'static str = "/api/refresh";
    pub const LOGOUT: &'static str = "/api/logout";
    pub const POSTS: &'static str = "/api/posts";
    pub const SEARCH: &'static str = "/api/search";
    pub const PROFILE: &'static str = "/api/profile";

    pub fn post(id: impl std::fmt::Display) -> String {
        format!("{}/{}", Self::POSTS, id)
    }

    pub fn comments(post_id: impl std::fmt::Display) -> String {
        format!("/api/comments/{}", post_id)
    }

    pub fn comment(post_id: impl std::fmt::Display, id: impl std::fmt::Display) -> String {
        format!("/api/comments/{}/{}", post_id, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_paths() {
        assert_eq!(Endpoints::post(5), "/api/posts/5");
        assert_eq!(Endpoints::comments(3), "/api/comments/3");
        assert_eq!(Endpoints::comment(3, 9), "/api/comments/3/9");
    }
}
