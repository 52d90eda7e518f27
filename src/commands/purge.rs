use tracing::debug;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::frame::Frame;
use crate::store::Store;
use crate::Error;

/// Removes every entry whose primary key starts with `prefix`, scrubbing the secondary indexes
/// as `DEL` does. The whole sweep runs under a single lock.
#[derive(Debug, PartialEq)]
pub struct Purge {
    pub prefix: String,
}

impl Purge {
    const USAGE: &'static str = "exactly one argument: PURGE <prefix>";
}

impl Executable for Purge {
    fn exec(self, store: Store) -> Result<Frame, Error> {
        let mut cache = store.lock();

        let matching: Vec<String> = cache
            .keys()
            .filter(|key| key.starts_with(&self.prefix))
            .cloned()
            .collect();

        for key in &matching {
            cache.remove(key);
        }

        debug!(prefix = %self.prefix, purged = matching.len(), "purged keys");

        let message = match matching.len() {
            0 => format!("OK: No keys matched the prefix '{}'.", self.prefix),
            n => format!("OK: Purged {} key(s) matching prefix '{}'.", n, self.prefix),
        };

        Ok(Frame::Simple(message))
    }
}

impl TryFrom<&mut CommandParser> for Purge {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let [prefix] = parser.exact(Self::USAGE)?;
        Ok(Self { prefix })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;
    use crate::store::EvictionPolicy;

    fn s(value: &str) -> String {
        value.to_string()
    }

    fn store() -> Store {
        let store = Store::new(EvictionPolicy::Lru, 16).unwrap();
        {
            let mut cache = store.lock();
            cache
                .put(s("user:1"), s("ana"), &[Some(s("ana@x")), None])
                .unwrap();
            cache.put(s("user:2"), s("bob"), &[]).unwrap();
            cache.put(s("order:1"), s("42"), &[]).unwrap();
        }
        store
    }

    #[test]
    fn matching_prefix() {
        let store = store();
        let cmd = Command::try_from("PURGE user:").unwrap();

        assert_eq!(cmd, Command::Purge(Purge { prefix: s("user:") }));
        assert_eq!(
            cmd.exec(store.clone()).unwrap(),
            Frame::Simple(s("OK: Purged 2 key(s) matching prefix 'user:'."))
        );

        let mut cache = store.lock();
        assert_eq!(cache.size(), 1);
        assert!(cache.contains_key(&s("order:1")));
        assert_eq!(cache.get_by_index_one(&s("ana@x")), None);
    }

    #[test]
    fn nothing_matches() {
        let store = store();
        let cmd = Command::try_from("PURGE session:").unwrap();

        assert_eq!(
            cmd.exec(store.clone()).unwrap(),
            Frame::Simple(s("OK: No keys matched the prefix 'session:'."))
        );
        assert_eq!(store.lock().size(), 3);
    }

    #[test]
    fn empty_prefix_matches_everything() {
        let store = store();
        let cmd = Command::try_from(r#"PURGE """#).unwrap();

        assert_eq!(
            cmd.exec(store.clone()).unwrap(),
            Frame::Simple(s("OK: Purged 3 key(s) matching prefix ''."))
        );
        assert!(store.lock().is_empty());
    }

    #[test]
    fn missing_prefix() {
        assert!(Command::try_from("PURGE").is_err());
    }
}
