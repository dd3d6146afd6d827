use crate::access::AccessScope;
use crate::commands::CmdResult;
use crate::error::Result;
use crate::store::DataStore;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagUsage {
    pub name: String,
    /// Sheets within the caller's scope carrying this tag
    pub count: usize,
}

/// Tags with usage counts, ordered by name ignoring case.
///
/// A public-only caller does not see tags that are used on private sheets alone.
pub fn run<S: DataStore>(store: &S, scope: AccessScope) -> Result<CmdResult> {
    let scoped = scope.narrow(store.list_sheets()?);

    let mut usage: Vec<TagUsage> = store
        .list_tags()?
        .into_iter()
        .map(|tag| TagUsage {
            count: scoped.iter().filter(|s| s.tags.contains(&tag.id)).count(),
            name: tag.name,
        })
        .filter(|u| scope == AccessScope::All || u.count > 0)
        .collect();
    usage.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });

    Ok(CmdResult::default().with_tags(usage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Sheet;
    use crate::store::memory::fixtures::blob;
    use crate::store::memory::InMemoryStore;
    use crate::tags::Tag;

    fn setup() -> InMemoryStore {
        let mut store = InMemoryStore::new();
        let advent = Tag::new("advent");
        let lent = Tag::new("Lent");
        let unused = Tag::new("Bach");
        for tag in [&advent, &lent, &unused] {
            store.save_tag(tag).unwrap();
        }

        let mut open = Sheet::new("Rorate", "X", "jana", blob("r.pdf"));
        open.public = true;
        open.tags = vec![advent.id];
        let mut closed = Sheet::new("Stabat", "X", "jana", blob("s.pdf"));
        closed.tags = vec![advent.id, lent.id];
        store.save_sheet(&open).unwrap();
        store.save_sheet(&closed).unwrap();
        store
    }

    #[test]
    fn privileged_caller_sees_every_tag_with_counts() {
        let result = run(&setup(), AccessScope::All).unwrap();
        let got: Vec<_> = result.tags.iter().map(|t| (t.name.as_str(), t.count)).collect();
        assert_eq!(got, vec![("advent", 2), ("Bach", 0), ("Lent", 1)]);
    }

    #[test]
    fn public_caller_counts_public_sheets_only() {
        let result = run(&setup(), AccessScope::PublicOnly).unwrap();
        let got: Vec<_> = result.tags.iter().map(|t| (t.name.as_str(), t.count)).collect();
        assert_eq!(got, vec![("advent", 1)]);
    }
}
