use crate::{Error, Result};

/// Renders a vector in pgvector's text form, for binding as `$n::text::vector`.
pub fn vector_to_pg(vec: &[f32]) -> String {
	let mut out = String::with_capacity(vec.len() * 8 + 2);

	out.push('[');

	for (i, value) in vec.iter().enumerate() {
		if i > 0 {
			out.push(',');
		}

		out.push_str(&value.to_string());
	}

	out.push(']');

	out
}

pub fn parse_pg_vector(text: &str) -> Result<Vec<f32>> {
	let inner = text
		.trim()
		.strip_prefix('[')
		.and_then(|rest| rest.strip_suffix(']'))
		.ok_or_else(|| Error::InvalidArgument("Vector text is not bracketed.".to_string()))?;

	if inner.trim().is_empty() {
		return Ok(Vec::new());
	}

	inner
		.split(',')
		.map(|part| {
			part.trim().parse::<f32>().map_err(|_| {
				Error::InvalidArgument("Vector text contains a non-numeric value.".to_string())
			})
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn text_form_round_trips() {
		let text = vector_to_pg(&[0.5, -1.0, 0.25]);

		assert_eq!(text, "[0.5,-1,0.25]");
		assert_eq!(parse_pg_vector(&text).expect("parse failed"), vec![0.5, -1.0, 0.25]);
	}

	#[test]
	fn malformed_text_is_rejected() {
		assert!(parse_pg_vector("0.5,1").is_err());
		assert!(parse_pg_vector("[0.5,abc]").is_err());
		assert_eq!(parse_pg_vector("[ ]").expect("empty"), Vec::<f32>::new());
	}
}
