use url::Url;

use super::error::PrintUrlError;
use crate::model::HostForm;

/// Query parameter carrying the selected documents.
pub const DOCS_PARAM: &str = "docs";
/// Query parameter carrying the page to come back to.
pub const RETURN_TO_PARAM: &str = "return_to";

/// Derives print-view URLs relative to the page the user is on.
#[derive(Debug, Clone)]
pub struct PrintUrlBuilder {
    current_page: Url,
}

impl PrintUrlBuilder {
    pub fn new(current_page: &Url) -> Self {
        Self {
            current_page: current_page.clone(),
        }
    }

    /// Builds the print URL from a button's `base` and an optional companion form.
    ///
    /// The base is resolved against the page origin. With a companion form,
    /// `docs` is replaced by the form's checked selections and its non-empty
    /// hidden fields are set as parameters. `return_to` defaults to the
    /// current page path but is never overwritten.
    pub fn build(
        &self,
        base: Option<&str>,
        companion: Option<&HostForm>,
    ) -> Result<Url, PrintUrlError> {
        let base = base
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .ok_or(PrintUrlError::NotConfigured)?;

        let mut url = self
            .origin()
            .join(base)
            .map_err(|source| PrintUrlError::InvalidBase {
                base: base.to_string(),
                source,
            })?;

        let mut params: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        if let Some(form) = companion {
            params.retain(|(k, _)| k != DOCS_PARAM);
            params.extend(
                form.checked_selections()
                    .into_iter()
                    .map(|doc| (DOCS_PARAM.to_string(), doc.to_string())),
            );
            for (name, value) in form.hidden_entries() {
                params.retain(|(k, _)| k != name);
                params.push((name.to_string(), value.to_string()));
            }
        }
        if !params.iter().any(|(k, _)| k == RETURN_TO_PARAM) {
            params.push((
                RETURN_TO_PARAM.to_string(),
                self.current_page.path().to_string(),
            ));
        }

        url.query_pairs_mut().clear().extend_pairs(&params);
        Ok(url)
    }

    fn origin(&self) -> Url {
        let mut root = self.current_page.clone();
        root.set_path("/");
        root.set_query(None);
        root.set_fragment(None);
        root
    }
}
