/// EC2 tag names stamped on and read from AEM instances
pub mod tag_names {
    /// DNS name of the author load balancer a dispatcher routes to
    /// Stamped on author-dispatcher instances once their flush agent exists
    pub const AUTHOR_HOST: &str = "AuthorHost";

    /// Stack prefix shared by every instance of one AEM environment
    pub const STACK_PREFIX: &str = "StackPrefix";
}

/// Build an owned key/value tag pair.
#[must_use]
pub fn tag_pair(key: &str, value: impl Into<String>) -> (String, String) {
    (key.to_string(), value.into())
}
