//! MetaImage header key names

pub const OBJECT_TYPE: &str = "ObjectType";
pub const NDIMS: &str = "NDims";
pub const BINARY_DATA: &str = "BinaryData";
pub const BINARY_DATA_BYTE_ORDER_MSB: &str = "BinaryDataByteOrderMSB";
pub const ELEMENT_BYTE_ORDER_MSB: &str = "ElementByteOrderMSB";
pub const COMPRESSED_DATA: &str = "CompressedData";
pub const COMPRESSED_DATA_SIZE: &str = "CompressedDataSize";
pub const TRANSFORM_MATRIX: &str = "TransformMatrix";
pub const ROTATION: &str = "Rotation";
pub const ORIENTATION: &str = "Orientation";
pub const OFFSET: &str = "Offset";
pub const ORIGIN: &str = "Origin";
pub const POSITION: &str = "Position";
pub const CENTER_OF_ROTATION: &str = "CenterOfRotation";
pub const ELEMENT_SPACING: &str = "ElementSpacing";
pub const ELEMENT_SIZE: &str = "ElementSize";
pub const DIM_SIZE: &str = "DimSize";
pub const HEADER_SIZE: &str = "HeaderSize";
pub const ELEMENT_NUMBER_OF_CHANNELS: &str = "ElementNumberOfChannels";
pub const ELEMENT_TYPE: &str = "ElementType";
pub const ELEMENT_DATA_FILE: &str = "ElementDataFile";
