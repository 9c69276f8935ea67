/// Location of the roadmap database.
///
/// Only the URL is configurable. The CLI resolves it from a flag, the
/// `PATHWISE_DATABASE_URL` environment variable or the config file.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Full PostgreSQL connection URL, including any `?query` options.
    pub database_url: String,
}

/// A connection URL split into server, database name and query options.
struct UrlParts<'a> {
    /// `scheme://userinfo@host:port`, without a trailing slash.
    server: &'a str,
    /// Empty when the URL names no database.
    database: &'a str,
    query: Option<&'a str>,
}

impl<'a> UrlParts<'a> {
    fn split(url: &'a str) -> Self {
        let (base, query) = match url.split_once('?') {
            Some((base, query)) => (base, Some(query)),
            None => (url, None),
        };
        let authority_start = base.find("://").map_or(0, |i| i + 3);
        match base[authority_start..].find('/') {
            Some(slash) => {
                let slash = authority_start + slash;
                Self {
                    server: &base[..slash],
                    database: &base[slash + 1..],
                    query,
                }
            }
            None => Self {
                server: base,
                database: "",
                query,
            },
        }
    }

    /// The same server and options pointed at another database.
    fn with_database(&self, database: &str) -> String {
        let mut url = format!("{}/{database}", self.server);
        if let Some(query) = self.query {
            url.push('?');
            url.push_str(query);
        }
        url
    }
}

impl DbConfig {
    pub const DEFAULT_URL: &str = "postgresql://localhost:5432/pathwise";

    pub const ENV_VAR: &str = "PATHWISE_DATABASE_URL";

    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    /// The database the roadmap tables live in, if the URL names one.
    pub fn database_name(&self) -> Option<&str> {
        Some(UrlParts::split(&self.database_url).database).filter(|name| !name.is_empty())
    }

    /// URL of the `postgres` maintenance database on the same server, used to
    /// issue `CREATE DATABASE`. TLS and other query options are kept.
    pub fn maintenance_url(&self) -> String {
        UrlParts::split(&self.database_url).with_database("postgres")
    }

    /// The URL with any password replaced by `***`, for logs and errors.
    pub fn redacted_url(&self) -> String {
        let parts = UrlParts::split(&self.database_url);
        let authority_start = parts.server.find("://").map_or(0, |i| i + 3);
        let authority = &parts.server[authority_start..];

        let Some((userinfo, host)) = authority.rsplit_once('@') else {
            return self.database_url.clone();
        };
        let Some((user, _password)) = userinfo.split_once(':') else {
            return self.database_url.clone();
        };

        let server = format!("{}{user}:***@{host}", &parts.server[..authority_start]);
        UrlParts {
            server: &server,
            database: parts.database,
            query: parts.query,
        }
        .with_database(parts.database)
    }
}
