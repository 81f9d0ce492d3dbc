use crate::crawler::Response;
use crate::extract::{ClassifiedItem, ExtractionError, ItemMeta};
use crate::url::{last_segment, percent_decode, split_extension};

/// Reduces a linked file to a file item
///
/// The title is the percent-decoded last path segment without its extension;
/// the extension is whatever follows the last `.`. Query strings never
/// contribute to either. The item is stored next to the page that linked it,
/// so a request without a referrer cannot be extracted.
pub fn extract_file(response: &Response) -> Result<ClassifiedItem, ExtractionError> {
    let url = response.url.as_str();

    let (stem, extension) = split_extension(response.url.path())
        .ok_or_else(|| ExtractionError::MissingExtension(url.to_string()))?;
    let title = percent_decode(last_segment(stem));

    let referrer = response
        .referrer()
        .ok_or_else(|| ExtractionError::MissingReferrer(url.to_string()))?;

    ItemMeta::new(&title, extension, referrer, url).map(ClassifiedItem::File)
}
