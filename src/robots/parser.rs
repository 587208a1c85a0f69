//! Robots.txt parser
//!
//! Only `User-agent` and `Disallow` take part in decisions. `Allow`,
//! `Crawl-delay`, `Sitemap`, wildcard patterns and unknown lines are read
//! past.

/// One `User-agent` block with its disallow prefixes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleGroup {
    /// Lowercased agent tokens; `*` matches everyone
    pub agents: Vec<String>,

    /// Non-empty path prefixes that are off-limits
    pub disallow: Vec<String>,
}

impl RuleGroup {
    fn is_wildcard(&self) -> bool {
        self.agents.iter().any(|a| a == "*")
    }

    /// Returns true if a non-wildcard agent of this group is one of the
    /// identity's product tokens
    ///
    /// A versioned agent line such as `Googlebot/2.1` is compared on its
    /// product name only.
    fn names(&self, tokens: &[&str]) -> bool {
        self.agents
            .iter()
            .filter(|a| a.as_str() != "*")
            .filter_map(|a| a.split('/').next().map(str::trim))
            .any(|product| !product.is_empty() && tokens.contains(&product))
    }
}

/// Parsed robots.txt rules for one origin
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsRules {
    groups: Vec<RuleGroup>,
}

impl RobotsRules {
    /// Parses raw robots.txt content
    ///
    /// Consecutive `User-agent` lines share one group; the first rule line
    /// closes the agent list, and the next `User-agent` starts a new group.
    /// Unparseable input yields no groups, which allows everything.
    pub fn parse(content: &str) -> Self {
        let mut groups: Vec<RuleGroup> = Vec::new();
        let mut current: Option<RuleGroup> = None;
        let mut in_agent_list = false;

        for line in content.lines() {
            let line = match line.split_once('#') {
                Some((before, _)) => before,
                None => line,
            }
            .trim();

            if line.is_empty() {
                continue;
            }

            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();

            match key.as_str() {
                "user-agent" => {
                    if !in_agent_list {
                        if let Some(group) = current.take() {
                            groups.push(group);
                        }
                        current = Some(RuleGroup::default());
                        in_agent_list = true;
                    }
                    if let Some(group) = current.as_mut() {
                        group.agents.push(value.to_lowercase());
                    }
                }
                "disallow" => {
                    in_agent_list = false;
                    // Empty Disallow means "nothing disallowed"
                    if let (Some(group), false) = (current.as_mut(), value.is_empty()) {
                        group.disallow.push(value.to_string());
                    }
                }
                _ => {
                    // Rule lines we do not evaluate still end the agent list
                    if current.is_some() {
                        in_agent_list = false;
                    }
                }
            }
        }

        if let Some(group) = current {
            groups.push(group);
        }

        Self { groups }
    }

    /// Rules that allow everything
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Checks whether `identity` may fetch `path`
    ///
    /// # Arguments
    ///
    /// * `identity` - The full user-agent string of the request
    /// * `path` - URL path plus query, e.g. `/search?q=x`
    ///
    /// # Returns
    ///
    /// * `false` - if a disallow prefix of the selected groups matches
    /// * `true` - otherwise
    pub fn is_allowed(&self, identity: &str, path: &str) -> bool {
        let identity = identity.to_lowercase();
        let tokens = product_tokens(&identity);

        let mut selected: Vec<&RuleGroup> =
            self.groups.iter().filter(|g| g.names(&tokens)).collect();
        if selected.is_empty() {
            selected = self.groups.iter().filter(|g| g.is_wildcard()).collect();
        }

        !selected
            .iter()
            .flat_map(|g| g.disallow.iter())
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    pub fn groups(&self) -> &[RuleGroup] {
        &self.groups
    }
}

/// Splits a user-agent string into its word-like tokens
///
/// `mozilla/5.0 (x11; linux) chrome/120.0` yields `mozilla`, `5`, `0`,
/// `x11`, `linux`, `chrome`, `120`, `0`.
fn product_tokens(identity: &str) -> Vec<&str> {
    identity
        .split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
        .filter(|t| !t.is_empty())
        .collect()
}
