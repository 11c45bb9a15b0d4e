pub const P_NAMESPACE: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
pub const A_NAMESPACE: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub const RELS_NAMESPACE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub const PACKAGE_RELS_NAMESPACE: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
pub const CONTENT_TYPES_NAMESPACE: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
pub const DC_NAMESPACE: &str = "http://purl.org/dc/elements/1.1/";
pub const P14_NAMESPACE: &str = "http://schemas.microsoft.com/office/powerpoint/2010/main";

pub const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const SLIDE_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";
pub const SLIDE_LAYOUT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";
pub const SLIDE_MASTER_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";

pub const SLIDE_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";
pub const PPTX_MEDIA_TYPE: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";

pub const TABLE_URI: &str = "http://schemas.openxmlformats.org/drawingml/2006/table";
pub const CHART_URI: &str = "http://schemas.openxmlformats.org/drawingml/2006/chart";

pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";
pub const ROOT_RELS_PART: &str = "_rels/.rels";
pub const DEFAULT_PRESENTATION_PART: &str = "ppt/presentation.xml";
pub const CORE_PROPS_PART: &str = "docProps/core.xml";
pub const APP_PROPS_PART: &str = "docProps/app.xml";

/// Lowest id PowerPoint accepts in `p:sldIdLst`.
pub const FIRST_SLIDE_ID: u32 = 256;
