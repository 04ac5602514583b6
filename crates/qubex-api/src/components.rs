// Component search endpoint
//
// Lists projects visible to the caller. Used for the project existence
// check, so it pages through everything rather than returning one page.

use tracing::debug;

use crate::auth::Credentials;
use crate::client::SonarClient;
use crate::error::Error;
use crate::models::{ComponentEntry, ComponentSearchResponse};

const PROJECT_QUALIFIER: &str = "TRK";
const COMPONENT_PAGE_SIZE: u32 = 500;

impl SonarClient {
    /// Fetch one page of projects.
    ///
    /// `GET /api/components/search?qualifiers=TRK&p={page}&ps={page_size}`
    pub async fn search_projects(
        &self,
        page: u32,
        page_size: u32,
        auth: Option<&Credentials>,
    ) -> Result<ComponentSearchResponse, Error> {
        self.get_json(
            "api/components/search",
            &[
                ("qualifiers", PROJECT_QUALIFIER.to_owned()),
                ("p", page.to_string()),
                ("ps", page_size.to_string()),
            ],
            auth,
        )
        .await
    }

    /// List every project visible to the caller, walking all pages.
    pub async fn list_projects(
        &self,
        auth: Option<&Credentials>,
    ) -> Result<Vec<ComponentEntry>, Error> {
        let mut all = Vec::new();
        let mut page = 1;

        loop {
            let resp = self.search_projects(page, COMPONENT_PAGE_SIZE, auth).await?;
            let pages = resp.paging.page_count();
            all.extend(resp.components);

            if page >= pages {
                break;
            }
            page += 1;
        }

        debug!(count = all.len(), "listed projects");
        Ok(all)
    }
}
