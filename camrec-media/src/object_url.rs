//! Temporary object URLs for finished recordings

use camrec_core::{Release, ResourceKind};
use std::fmt;

/// A process-local URL pointing at a recording, revoked on release
pub struct ObjectUrl {
    url: String,
    revoke: Option<Box<dyn FnOnce(&str)>>,
}

impl ObjectUrl {
    /// Wrap `url`; `revoke` runs once when the URL is released
    pub fn new(url: impl Into<String>, revoke: impl FnOnce(&str) + 'static) -> Self {
        Self {
            url: url.into(),
            revoke: Some(Box::new(revoke)),
        }
    }

    /// The URL itself
    pub fn as_str(&self) -> &str {
        &self.url
    }
}

impl Release for ObjectUrl {
    fn kind(&self) -> ResourceKind {
        ResourceKind::ObjectUrl
    }

    fn release(&mut self) {
        if let Some(revoke) = self.revoke.take() {
            revoke(&self.url);
        }
    }
}

impl fmt::Debug for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectUrl")
            .field("url", &self.url)
            .field("revoked", &self.revoke.is_none())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_release_revokes_once() {
        let revoked = Rc::new(RefCell::new(Vec::new()));
        let sink = revoked.clone();
        let mut url = ObjectUrl::new("blob:test/1", move |url| {
            sink.borrow_mut().push(url.to_string())
        });

        url.release();
        url.release();

        assert_eq!(*revoked.borrow(), vec!["blob:test/1".to_string()]);
    }
}
