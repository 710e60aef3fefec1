//! Digest delivery.

pub mod email;
pub mod file;

pub use email::EmailNotifier;
pub use file::FileNotifier;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Delivery;
use crate::error::NotifyError;

/// Delivers finished content somewhere.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Notifier name (e.g. "email", "file").
    fn name(&self) -> &str;

    /// Deliver the content. Errors are reported, never retried.
    async fn deliver(&self, content: &str) -> Result<(), NotifyError>;
}

/// Build the notifier for the configured delivery mode.
pub fn create_notifier(delivery: &Delivery) -> Arc<dyn Notifier> {
    match delivery {
        Delivery::Email(mail) => Arc::new(EmailNotifier::new(mail.clone())),
        Delivery::File(path) => Arc::new(FileNotifier::new(path.clone())),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn file_delivery_builds_file_notifier() {
        let notifier = create_notifier(&Delivery::File(PathBuf::from("./tmp.md")));
        assert_eq!(notifier.name(), "file");
    }
}
