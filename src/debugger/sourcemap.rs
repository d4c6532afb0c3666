/// Path translation between the client source tree and the tree the simulation was built in.
#[derive(Debug, Default, Clone)]
pub struct SourceMap {
    /// Build tree prefix (normalized) to client prefix.
    target_to_client: Vec<(String, String)>,
    /// Client prefix (normalized) to build tree prefix.
    client_to_target: Vec<(String, String)>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a prefix pair. A pair with the same client prefix is replaced.
    pub fn add(&mut self, client_prefix: &str, target_prefix: &str) {
        let client_norm = Self::norm_prefix(client_prefix);
        let target_norm = Self::norm_prefix(target_prefix);

        self.client_to_target.retain(|(from, _)| from != &client_norm);
        self.target_to_client.retain(|(from, _)| from != &target_norm);

        self.target_to_client
            .push((target_norm, client_prefix.to_string()));
        self.client_to_target
            .push((client_norm, target_prefix.to_string()));

        // longest prefix wins
        self.target_to_client
            .sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        self.client_to_target
            .sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    pub fn is_empty(&self) -> bool {
        self.client_to_target.is_empty()
    }

    pub fn map_target_to_client(&self, target_path: &str) -> String {
        Self::apply_map(target_path, &self.target_to_client)
    }

    pub fn map_client_to_target(&self, client_path: &str) -> String {
        Self::apply_map(client_path, &self.client_to_target)
    }

    fn apply_map(path: &str, mapping: &[(String, String)]) -> String {
        let normalized = Self::norm_path(path);
        for (from_norm, to_raw) in mapping {
            if let Some(suffix) = normalized.strip_prefix(from_norm.as_str()) {
                return Self::join_with_style(to_raw, suffix);
            }
            // path equals prefix without trailing separator
            if normalized == from_norm[..from_norm.len() - 1] {
                return to_raw.clone();
            }
        }
        path.to_string()
    }

    fn join_with_style(prefix: &str, suffix_norm: &str) -> String {
        if suffix_norm.is_empty() {
            return prefix.to_string();
        }
        let backslash = prefix.contains('\\');
        let mut out = prefix.to_string();
        if !out.ends_with('/') && !out.ends_with('\\') {
            out.push(if backslash { '\\' } else { '/' });
        }
        if backslash {
            out.push_str(&suffix_norm.replace('/', "\\"));
        } else {
            out.push_str(suffix_norm);
        }
        out
    }

    fn norm_prefix(s: &str) -> String {
        let mut out = Self::norm_path(s);
        if !out.ends_with('/') {
            out.push('/');
        }
        out
    }

    fn norm_path(s: &str) -> String {
        s.replace('\\', "/")
    }
}
