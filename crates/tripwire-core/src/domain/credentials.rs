//! Access credentials and bucket regions.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};

/// Access key pair supplied by the caller for one remote service client.
///
/// The secret half never appears in `Debug` output or logs.
#[derive(Debug, Deserialize)]
pub struct AccessKeyPair {
    #[serde(rename = "aws_access_key", default)]
    pub access_key: String,

    #[serde(
        rename = "aws_secret_access_key",
        default = "empty_secret",
        deserialize_with = "deserialize_secret"
    )]
    pub secret_access_key: SecretString,
}

impl AccessKeyPair {
    pub fn new(access_key: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_access_key: SecretString::from(secret_access_key.into()),
        }
    }

    /// Names of the halves that are blank, in declaration order.
    pub fn blank_fields(&self) -> Vec<&'static str> {
        let mut blank = Vec::new();
        if self.access_key.trim().is_empty() {
            blank.push("aws_access_key");
        }
        if self.secret_access_key.expose_secret().trim().is_empty() {
            blank.push("aws_secret_access_key");
        }
        blank
    }
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

/// Region a state bucket is created in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketRegion {
    #[default]
    Us,
    Eu,
    Sfo,
    Asp1,
}

impl BucketRegion {
    /// Location constraint understood by the object store service.
    pub fn location_constraint(self) -> &'static str {
        match self {
            BucketRegion::Us => "us-east-1",
            BucketRegion::Eu => "eu-west-1",
            BucketRegion::Sfo => "us-west-1",
            BucketRegion::Asp1 => "ap-southeast-1",
        }
    }
}
