//! Search by example images: the vision model describes the garments and the description is
//! searched.

use crate::{AtelierService, Error, Result, SearchOptions, SearchResponse, search};

pub const MAX_IMAGES: usize = 3;

impl AtelierService {
	/// `images` are 1 to 3 URLs or data URLs. `text` is optional extra wording from the shopper.
	pub async fn search_by_images(
		&self,
		images: &[String],
		text: Option<&str>,
		options: &SearchOptions,
	) -> Result<SearchResponse> {
		let images = validate_images(images)?;
		let Some(cfg) = search::vision_config(self.cfg.providers.vision.as_ref()) else {
			return Err(Error::Provider {
				message: "Visual search needs a configured vision model.".to_string(),
			});
		};
		let description =
			self.providers.vision.describe_images(cfg, &images).await.map_err(|err| {
				tracing::error!(images = images.len(), error = %err, "Image description failed.");

				Error::from(err)
			})?;
		let description = description.trim();

		if description.is_empty() {
			return Err(Error::Provider {
				message: "Vision model returned an empty description.".to_string(),
			});
		}

		let query = combined_query(text, description);

		tracing::info!(images = images.len(), query = %query, "Searching by images.");

		self.search(&query, options).await
	}
}

/// The shopper's text first, then the image description.
pub fn combined_query(text: Option<&str>, description: &str) -> String {
	match text.map(str::trim).filter(|text| !text.is_empty()) {
		Some(text) => format!("{text}. Additional context from images: {description}"),
		None => description.to_string(),
	}
}

fn validate_images(images: &[String]) -> Result<Vec<String>> {
	let images: Vec<String> = images
		.iter()
		.map(|image| image.trim())
		.filter(|image| !image.is_empty())
		.map(str::to_string)
		.collect();

	if images.is_empty() || images.len() > MAX_IMAGES {
		return Err(Error::InvalidRequest {
			message: format!("Provide between 1 and {MAX_IMAGES} images."),
		});
	}

	Ok(images)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn text_prefixes_the_description() {
		assert_eq!(
			combined_query(Some(" for a wedding "), "A green silk slip dress"),
			"for a wedding. Additional context from images: A green silk slip dress"
		);
		assert_eq!(
			combined_query(Some("  "), "A green silk slip dress"),
			"A green silk slip dress"
		);
		assert_eq!(combined_query(None, "Loafers"), "Loafers");
	}

	#[test]
	fn image_count_is_bounded() {
		let one = vec!["https://img.example/a.jpg".to_string(), " ".to_string()];
		let four = vec!["https://img.example/a.jpg".to_string(); 4];

		assert_eq!(validate_images(&one).expect("valid").len(), 1);
		assert!(validate_images(&[]).is_err());
		assert!(validate_images(&four).is_err());
	}
}
