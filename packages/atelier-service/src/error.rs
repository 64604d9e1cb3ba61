pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	/// The language model reply could not be turned into a search intent.
	#[error("We couldn't understand that search. Please try rephrasing it.")]
	IntentParse { query: String, message: String },
	/// Neither semantic nor text retrieval could reach the catalog.
	#[error("Search is temporarily unavailable. Please try again shortly.")]
	Unavailable { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl Error {
	/// Detail behind the user-facing message, for logs.
	pub fn detail(&self) -> &str {
		match self {
			Self::InvalidRequest { message }
			| Self::IntentParse { message, .. }
			| Self::Unavailable { message }
			| Self::Provider { message }
			| Self::Storage { message } => message,
		}
	}
}

impl From<atelier_storage::Error> for Error {
	fn from(err: atelier_storage::Error) -> Self {
		match err {
			atelier_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			atelier_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
		}
	}
}

impl From<atelier_providers::Error> for Error {
	fn from(err: atelier_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
