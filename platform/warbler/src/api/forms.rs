use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use validator::{Validate, ValidationErrors};

/// Field name to the messages shown next to that field.
pub type FormErrors = BTreeMap<String, Vec<String>>;

/// Browsers submit untouched inputs as empty strings.
fn empty_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
	let value = Option::<String>::deserialize(deserializer)?;
	Ok(value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()))
}

pub fn form_errors(errors: &ValidationErrors) -> FormErrors {
	errors
		.field_errors()
		.into_iter()
		.map(|(field, errors)| {
			let messages = errors
				.iter()
				.map(|err| match &err.message {
					Some(message) => message.to_string(),
					None => format!("Invalid {field}."),
				})
				.collect();

			(field.to_string(), messages)
		})
		.collect()
}

/// Runs the form's validators and collects what failed.
pub fn check<T: Validate>(form: &T) -> Result<(), FormErrors> {
	form.validate().map_err(|errors| form_errors(&errors))
}

#[derive(Debug, Clone, Default, Deserialize, serde::Serialize, Validate)]
pub struct SignupForm {
	#[serde(default)]
	#[validate(length(min = 1, max = 30, message = "Username must be between 1 and 30 characters."))]
	pub username: String,

	#[serde(default)]
	#[validate(email(message = "Please enter a valid email address."))]
	pub email: String,

	#[serde(default, skip_serializing)]
	#[validate(length(min = 6, message = "Password must be at least 6 characters."))]
	pub password: String,

	#[serde(default, deserialize_with = "empty_as_none")]
	#[validate(url(message = "Please enter a valid image URL."))]
	pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, serde::Serialize, Validate)]
pub struct LoginForm {
	#[serde(default)]
	#[validate(length(min = 1, message = "Username is required."))]
	pub username: String,

	#[serde(default, skip_serializing)]
	#[validate(length(min = 6, message = "Password must be at least 6 characters."))]
	pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, serde::Serialize, Validate)]
pub struct ProfileForm {
	#[serde(default)]
	#[validate(length(min = 1, max = 30, message = "Username must be between 1 and 30 characters."))]
	pub username: String,

	#[serde(default)]
	#[validate(email(message = "Please enter a valid email address."))]
	pub email: String,

	#[serde(default, deserialize_with = "empty_as_none")]
	#[validate(url(message = "Please enter a valid image URL."))]
	pub image_url: Option<String>,

	#[serde(default, deserialize_with = "empty_as_none")]
	#[validate(url(message = "Please enter a valid header image URL."))]
	pub header_image_url: Option<String>,

	#[serde(default, deserialize_with = "empty_as_none")]
	pub bio: Option<String>,

	#[serde(default, deserialize_with = "empty_as_none")]
	#[validate(length(max = 100, message = "Location must be at most 100 characters."))]
	pub location: Option<String>,

	#[serde(default, skip_serializing)]
	#[validate(length(min = 1, message = "Please enter your password."))]
	pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, serde::Serialize, Validate)]
pub struct MessageForm {
	#[serde(default)]
	#[validate(length(min = 1, max = 140, message = "Messages must be between 1 and 140 characters."))]
	pub text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
	#[serde(default, deserialize_with = "empty_as_none")]
	pub q: Option<String>,
}
