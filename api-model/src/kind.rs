use std::fmt;
use std::marker::PhantomData;

use serde::de::{Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// A type that travels on the wire as a `kind`-tagged record.
///
/// Each resource owns two kind strings: one for the full representation
/// and one for the abbreviated link representation that only locates the
/// resource.
pub trait Resource {
    /// Kind string of the full representation.
    const KIND: &'static str;
    /// Kind string of the link representation.
    const LINK_KIND: &'static str;
}

/// Which of the two wire representations a record carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Representation {
    /// All populated attributes are present.
    #[default]
    Full,
    /// Only the locator fields (`id`, `href`) are meaningful.
    Link,
}

/// The `kind` discriminator of a resource record.
///
/// Serializes as `R::KIND` or `R::LINK_KIND` depending on the
/// representation. Kind strings that are absent or unrecognized decode as
/// the full representation so that records from newer servers are not
/// rejected.
pub struct Kind<R: Resource> {
    rep: Representation,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Kind<R> {
    pub fn full() -> Self {
        Self::of(Representation::Full)
    }

    pub fn link() -> Self {
        Self::of(Representation::Link)
    }

    pub fn of(rep: Representation) -> Self {
        Self {
            rep,
            _resource: PhantomData,
        }
    }

    pub fn representation(&self) -> Representation {
        self.rep
    }

    pub fn is_link(&self) -> bool {
        self.rep == Representation::Link
    }

    /// The kind string emitted on the wire.
    pub fn as_str(&self) -> &'static str {
        match self.rep {
            | Representation::Full => R::KIND,
            | Representation::Link => R::LINK_KIND,
        }
    }
}

impl<R: Resource> Default for Kind<R> {
    fn default() -> Self {
        Self::full()
    }
}

impl<R: Resource> Clone for Kind<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: Resource> Copy for Kind<R> {}

impl<R: Resource> PartialEq for Kind<R> {
    fn eq(&self, other: &Self) -> bool {
        self.rep == other.rep
    }
}

impl<R: Resource> Eq for Kind<R> {}

impl<R: Resource> fmt::Debug for Kind<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<R: Resource> fmt::Display for Kind<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<R: Resource> Serialize for Kind<R> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de, R: Resource> Deserialize<'de> for Kind<R> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct KindVisitor<R>(PhantomData<fn() -> R>);

        impl<'de, R: Resource> Visitor<'de> for KindVisitor<R> {
            type Value = Kind<R>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a kind string such as {:?}", R::KIND)
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                if value == R::LINK_KIND {
                    Ok(Kind::link())
                } else {
                    Ok(Kind::full())
                }
            }
        }

        deserializer.deserialize_str(KindVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use super::*;

    struct Gadget;

    impl Resource for Gadget {
        const KIND: &'static str = "Gadget";
        const LINK_KIND: &'static str = "GadgetLink";
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Record {
        kind: Kind<Gadget>,
        id: Option<String>,
    }

    #[test]
    fn kind_round_trip() -> anyhow::Result<()> {
        let full: Kind<Gadget> = serde_json::from_value(json!("Gadget"))?;
        assert_eq!(Representation::Full, full.representation());
        assert_eq!("Gadget", serde_json::to_value(full)?);

        let link: Kind<Gadget> = serde_json::from_value(json!("GadgetLink"))?;
        assert!(link.is_link());
        assert_eq!("GadgetLink", serde_json::to_value(link)?);
        Ok(())
    }

    #[test]
    fn unrecognized_kind_decodes_as_full() -> anyhow::Result<()> {
        let kind: Kind<Gadget> =
            serde_json::from_value(json!("GadgetSummary"))?;
        assert_eq!(Representation::Full, kind.representation());
        Ok(())
    }

    #[test]
    fn kind_is_written_first() -> anyhow::Result<()> {
        let record = Record {
            kind: Kind::link(),
            id: Some("g-1".into()),
        };
        let text = serde_json::to_string(&record)?;
        assert!(
            text.starts_with("{\"kind\":\"GadgetLink\""),
            "unexpected field order: {text}"
        );
        Ok(())
    }
}
