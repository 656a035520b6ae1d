//! The 13-column sheet row layout and validation-line classification.

use std::fmt;

/// Number of tab-separated columns in a sheet row (A through M).
pub const COLUMN_COUNT: usize = 13;

/// Named, non-blank columns of a sheet row.
///
/// Columns A, B, C and E are always left empty and have no variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    /// D: recipient name.
    ShipToName,
    /// F: street address, unit merged in.
    ShipToAddress1,
    /// G: city, title case.
    ShipToCity,
    /// H: two-letter USPS state code.
    ShipToState,
    /// I: 5 or 9 digit ZIP.
    ShipToZip,
    /// J: always `US`.
    Country,
    /// K: recipient phone.
    ShipToPhone,
    /// L: `COLOR-WT-SIZE`.
    ColorSize,
    /// M: quantity.
    Quantity,
}

impl Column {
    /// Every named column in sheet order.
    pub const ALL: [Column; 9] = [
        Column::ShipToName,
        Column::ShipToAddress1,
        Column::ShipToCity,
        Column::ShipToState,
        Column::ShipToZip,
        Column::Country,
        Column::ShipToPhone,
        Column::ColorSize,
        Column::Quantity,
    ];

    /// Zero-based position in the tab-separated row.
    pub fn index(self) -> usize {
        match self {
            Column::ShipToName => 3,
            Column::ShipToAddress1 => 5,
            Column::ShipToCity => 6,
            Column::ShipToState => 7,
            Column::ShipToZip => 8,
            Column::Country => 9,
            Column::ShipToPhone => 10,
            Column::ColorSize => 11,
            Column::Quantity => 12,
        }
    }

    /// Sheet column letter.
    pub fn letter(self) -> char {
        match self {
            Column::ShipToName => 'D',
            Column::ShipToAddress1 => 'F',
            Column::ShipToCity => 'G',
            Column::ShipToState => 'H',
            Column::ShipToZip => 'I',
            Column::Country => 'J',
            Column::ShipToPhone => 'K',
            Column::ColorSize => 'L',
            Column::Quantity => 'M',
        }
    }

    /// Header used for this column in CSV exports.
    pub fn export_header(self) -> &'static str {
        match self {
            Column::ShipToName => "Name",
            Column::ShipToAddress1 => "Address1",
            Column::ShipToCity => "City",
            Column::ShipToState => "State",
            Column::ShipToZip => "Zip",
            Column::Country => "Country",
            Column::ShipToPhone => "Phone",
            Column::ColorSize => "ColorSize",
            Column::Quantity => "Quantity",
        }
    }
}

/// A sheet row split into its tab-separated cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingRow {
    cells: Vec<String>,
}

impl ShippingRow {
    /// Split a tab-separated row. No trimming is applied to individual cells.
    pub fn from_tab_data(tab_data: &str) -> Self {
        Self {
            cells: tab_data.split('\t').map(str::to_owned).collect(),
        }
    }

    /// Cell value for a named column; missing cells read as empty.
    pub fn get(&self, column: Column) -> &str {
        self.cell(column.index())
    }

    /// Cell value by zero-based position; missing cells read as empty.
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map_or("", String::as_str)
    }

    /// Number of cells actually present.
    pub fn column_count(&self) -> usize {
        self.cells.len()
    }

    /// Whether the row has exactly [`COLUMN_COUNT`] cells.
    pub fn is_complete(&self) -> bool {
        self.cells.len() == COLUMN_COUNT
    }

    /// Re-join the cells with tabs.
    pub fn to_tab_data(&self) -> String {
        self.cells.join("\t")
    }
}

/// Outcome reported by a validation line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    /// Address accepted (`✅ ...`).
    Valid,
    /// Model flagged the ZIP, city or state (`⚠️ ...`).
    Suspect,
    /// Line missing or in an unrecognised form.
    Unknown,
}

impl ValidationStatus {
    /// Classify a validation line by the marker it contains. A warning sign
    /// anywhere in the line wins over a check mark.
    pub fn classify(line: &str) -> Self {
        if line.contains('\u{26A0}') {
            Self::Suspect
        } else if line.contains('\u{2705}') {
            Self::Valid
        } else {
            Self::Unknown
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Valid => "valid",
            Self::Suspect => "check",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}
