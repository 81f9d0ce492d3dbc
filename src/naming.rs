//! Storage paths for classified items
//!
//! An item is stored under the directory of its origin URL, so the mirror
//! reproduces the site's structure: a file linked from `/lessons/week-1/` lands
//! in `lessons/week-1/` next to that page.

use crate::extract::ClassifiedItem;
use crate::url::directory_of;

/// Computes the relative storage path of an item
///
/// `directory_of(origin_url) + title + "." + extension`, where the directory is
/// the percent-decoded origin path with a leading and trailing `/`. The result
/// depends on nothing but the item. Two items may map to the same path; the
/// later download overwrites the earlier one.
///
/// # Example
///
/// ```
/// use members_mirror::extract::{ClassifiedItem, ItemMeta};
/// use members_mirror::naming::storage_path;
///
/// let meta = ItemMeta::new(
///     "My File",
///     "mp3",
///     "https://example.com/lessons/audio/",
///     "https://example.com/dir/My%20File.mp3",
/// )
/// .unwrap();
/// assert_eq!(storage_path(&ClassifiedItem::File(meta)), "/lessons/audio/My File.mp3");
/// ```
pub fn storage_path(item: &ClassifiedItem) -> String {
    format!(
        "{}{}.{}",
        directory_of(item.origin_url()),
        item.title(),
        item.extension()
    )
}
