/// Repository binding for one MCP session, taken from the request path
/// `/api/mcp/{owner}/{repo}`. Sessions opened on the bare endpoint carry
/// an unbound scope and every tool call reports the scope error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryScope {
    owner: Option<String>,
    repo: Option<String>,
}

impl RepositoryScope {
    /// Unbound scope for the bare `/api/mcp` endpoint.
    pub fn unbound() -> Self {
        Self::default()
    }

    /// Scope bound to a repository. Blank components leave the scope
    /// unbound rather than half-bound.
    pub fn bound(owner: &str, repo: &str) -> Self {
        let owner = owner.trim();
        let repo = repo.trim();
        if owner.is_empty() || repo.is_empty() {
            return Self::unbound();
        }
        Self {
            owner: Some(owner.to_string()),
            repo: Some(repo.to_string()),
        }
    }

    /// Owner and repo when both are present, otherwise `None`.
    pub fn get(&self) -> Option<(&str, &str)> {
        match (self.owner.as_deref(), self.repo.as_deref()) {
            (Some(owner), Some(repo)) => Some((owner, repo)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbound_scope_resolves_to_none() {
        assert_eq!(RepositoryScope::unbound().get(), None);
    }

    #[test]
    fn bound_scope_resolves_both_components() {
        let scope = RepositoryScope::bound("acme", "widgets");
        assert_eq!(scope.get(), Some(("acme", "widgets")));
    }

    #[test]
    fn blank_components_leave_scope_unbound() {
        assert_eq!(RepositoryScope::bound("", "widgets").get(), None);
        assert_eq!(RepositoryScope::bound("acme", "").get(), None);
        assert_eq!(RepositoryScope::bound("  ", "   ").get(), None);
    }

    #[test]
    fn components_are_trimmed() {
        let scope = RepositoryScope::bound(" acme ", " widgets ");
        assert_eq!(scope.get(), Some(("acme", "widgets")));
    }
}
