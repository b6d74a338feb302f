//! Request classification.
//!
//! Every intercepted request falls into exactly one [`RequestClass`]. Rules are
//! tried in a fixed order and the first match wins, so an API path ending in
//! `.js` is still an API request.

use std::fmt;

use smol_str::SmolStr;
use swcache_core::{Destination, FetchRequest, RequestMode};

use crate::config::RouteRules;

/// The class of an intercepted request, which selects its caching strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestClass {
    /// API-shaped data, resolved network-first against the data partition.
    Api,
    /// Images, fonts, stylesheets and scripts, resolved cache-first against the static partition.
    StaticAsset,
    /// Top-level document loads, resolved network-first with a shell fallback.
    Navigation,
    /// Everything else, passed through with a fallback to any partition.
    Other,
}

impl RequestClass {
    /// Returns the class as a string slice, used as a metrics label.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestClass::Api => "api",
            RequestClass::StaticAsset => "static_asset",
            RequestClass::Navigation => "navigation",
            RequestClass::Other => "other",
        }
    }
}

impl fmt::Display for RequestClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pure request classifier.
///
/// ```
/// use http::Uri;
/// use swcache::{Classifier, RequestClass};
/// use swcache_core::FetchRequest;
///
/// let classifier = Classifier::default();
/// let request = FetchRequest::get(Uri::from_static("https://praise.example/api/app.js"));
/// assert_eq!(classifier.classify(&request), RequestClass::Api);
/// ```
#[derive(Debug, Clone)]
pub struct Classifier {
    api_prefix: SmolStr,
    data_marker: SmolStr,
    static_extensions: Vec<SmolStr>,
}

impl Classifier {
    /// Builds a classifier from route rules.
    pub fn new(rules: &RouteRules) -> Self {
        Self {
            api_prefix: SmolStr::new(&rules.api_prefix),
            data_marker: SmolStr::new(&rules.data_marker),
            static_extensions: rules.static_extensions.iter().map(SmolStr::new).collect(),
        }
    }

    /// Classifies a request by its path, destination and mode.
    pub fn classify(&self, request: &FetchRequest) -> RequestClass {
        let path = request.path();

        if self.is_api(path) {
            return RequestClass::Api;
        }
        if matches!(request.destination(), Destination::Image | Destination::Font)
            || self.static_extensions.iter().any(|ext| path.ends_with(ext.as_str()))
        {
            return RequestClass::StaticAsset;
        }
        if request.mode() == RequestMode::Navigate {
            return RequestClass::Navigation;
        }
        RequestClass::Other
    }

    fn is_api(&self, path: &str) -> bool {
        (!self.api_prefix.is_empty() && path.starts_with(self.api_prefix.as_str()))
            || (!self.data_marker.is_empty() && path.contains(self.data_marker.as_str()))
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&RouteRules::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Uri;

    fn get(path: &'static str) -> FetchRequest {
        FetchRequest::get(Uri::from_static(path))
    }

    #[test]
    fn api_prefix_and_data_marker() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify(&get("https://praise.example/api/songs")), RequestClass::Api);
        assert_eq!(
            classifier.classify(&get("https://praise.example/songs/metadata")),
            RequestClass::Api
        );
        assert_eq!(
            classifier.classify(&get("https://praise.example/rehearsals")),
            RequestClass::Other
        );
    }

    #[test]
    fn api_wins_over_static_extension() {
        let classifier = Classifier::default();
        let request = get("https://praise.example/api/bundle.js");
        assert_eq!(classifier.classify(&request), RequestClass::Api);

        let image = get("https://praise.example/data/cover.png").with_destination(Destination::Image);
        assert_eq!(classifier.classify(&image), RequestClass::Api);
    }

    #[test]
    fn static_assets_by_destination_or_extension() {
        let classifier = Classifier::default();
        let logo = get("https://praise.example/logo192.png").with_destination(Destination::Image);
        let font = get("https://fonts.example/inter").with_destination(Destination::Font);
        let css = get("https://praise.example/static/main.css");
        let js = get("https://praise.example/static/main.js");

        for request in [logo, font, css, js] {
            assert_eq!(classifier.classify(&request), RequestClass::StaticAsset);
        }
    }

    #[test]
    fn static_wins_over_navigation() {
        let classifier = Classifier::default();
        let request = FetchRequest::navigate(Uri::from_static("https://praise.example/app.js"));
        assert_eq!(classifier.classify(&request), RequestClass::StaticAsset);
    }

    #[test]
    fn navigation_by_mode() {
        let classifier = Classifier::default();
        let request = FetchRequest::navigate(Uri::from_static("https://praise.example/songs"));
        assert_eq!(classifier.classify(&request), RequestClass::Navigation);

        let png_without_destination = get("https://praise.example/logo192.png");
        assert_eq!(classifier.classify(&png_without_destination), RequestClass::Other);
    }

    #[test]
    fn query_string_is_not_part_of_path() {
        let classifier = Classifier::default();
        let request = get("https://praise.example/search?q=data");
        assert_eq!(classifier.classify(&request), RequestClass::Other);
    }

    #[test]
    fn empty_marker_disables_substring_rule() {
        let classifier = Classifier::new(&RouteRules {
            data_marker: String::new(),
            ..RouteRules::default()
        });
        assert_eq!(
            classifier.classify(&get("https://praise.example/songs/metadata")),
            RequestClass::Other
        );
    }
}
