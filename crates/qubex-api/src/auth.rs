use secrecy::{ExposeSecret, SecretString};

/// Basic-auth credentials for a SonarQube server.
///
/// A user token is sent as the username with an empty password, which is
/// how SonarQube accepts tokens over basic auth. The secret never appears
/// in `Debug` output.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    /// Token credentials: token as username, empty password.
    pub fn token(token: &SecretString) -> Self {
        Self {
            username: token.expose_secret().to_owned(),
            password: SecretString::from(String::new()),
        }
    }

    /// Attach these credentials to a request.
    pub(crate) fn apply(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let password = self.password.expose_secret();
        if password.is_empty() {
            request.basic_auth(&self.username, None::<&str>)
        } else {
            request.basic_auth(&self.username, Some(password))
        }
    }
}
