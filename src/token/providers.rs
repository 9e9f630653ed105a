use super::{ldap::LdapTokenOptions, TokenError, TokenProviders};
use crate::utils::logging::Logger;

const GITHUB_TOKEN_URL: &str = "https://github.com/settings/tokens/new";
const GITLAB_TOKEN_URL: &str = "https://gitlab.com/profile/personal_access_tokens";
const GOOGLE_TOKEN_URL: &str = "https://developers.google.com/oauthplayground/";
const APPSCODE_TOKEN_URL: &str = "https://appscode.com/settings/tokens";

/// Sends the operator to each provider's token page; LDAP tokens are computed locally.
pub struct BrowserProviders;

impl BrowserProviders {
    fn show(&self, provider: &str, url: &str) -> std::io::Result<()> {
        println!("{} url for personal access tokens: {}", provider, url);
        open::that(url)
    }
}

impl TokenProviders for BrowserProviders {
    fn github(&mut self, logger: &mut dyn Logger) {
        if let Err(e) = self.show("Github", GITHUB_TOKEN_URL) {
            logger.log(&format!("Could not open a browser: {}", e));
        }
    }

    fn gitlab(&mut self, logger: &mut dyn Logger) {
        if let Err(e) = self.show("Gitlab", GITLAB_TOKEN_URL) {
            logger.log(&format!("Could not open a browser: {}", e));
        }
    }

    fn google(&mut self, logger: &mut dyn Logger) -> Result<(), TokenError> {
        logger.debug_log("Requesting a Google ID token through the OAuth playground");
        self.show("Google", GOOGLE_TOKEN_URL)
            .map_err(TokenError::Browser)?;
        println!("Authorize the \"Google OAuth2 API v2\" scopes and use the id_token as bearer token.");
        Ok(())
    }

    fn appscode(&mut self, logger: &mut dyn Logger) -> Result<(), TokenError> {
        logger.debug_log("Requesting an AppsCode API token");
        self.show("Appscode", APPSCODE_TOKEN_URL)
            .map_err(TokenError::Browser)
    }

    fn ldap(&mut self, options: &LdapTokenOptions, logger: &mut dyn Logger) -> Result<(), TokenError> {
        logger.debug_log(&format!("Issuing LDAP token ({:?} auth)", options.auth_choice));
        let token = options.issue_token()?;
        println!("Token: {}", token);
        Ok(())
    }
}
