use std::sync::Arc;

use foldhash::HashMap;

use crate::pal::{Filesystem, FilesystemFacade};
use crate::{Options, UNKNOWN};

/// A PCI vendor and the products it makes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Vendor {
    id: String,
    name: String,
    products: Vec<Arc<Product>>,
}

impl Vendor {
    pub(crate) fn unknown(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: UNKNOWN.to_string(),
            products: Vec::new(),
        }
    }

    /// The four-digit lower-case hex vendor ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The vendor name, or [`UNKNOWN`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The products of the vendor, in database order.
    #[must_use]
    pub fn products(&self) -> &[Arc<Product>] {
        &self.products
    }
}

/// A PCI product (device) of a vendor.
///
/// Subsystems are products too: the subsystem vendor and product IDs identify the board that a
/// chip was built into.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Product {
    vendor_id: String,
    id: String,
    name: String,
    subsystems: Vec<Arc<Product>>,
}

impl Product {
    pub(crate) fn unknown(vendor_id: &str, id: &str) -> Self {
        Self {
            vendor_id: vendor_id.to_string(),
            id: id.to_string(),
            name: UNKNOWN.to_string(),
            subsystems: Vec::new(),
        }
    }

    /// The ID of the vendor of the product.
    #[must_use]
    pub fn vendor_id(&self) -> &str {
        &self.vendor_id
    }

    /// The four-digit lower-case hex product ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The product name, or [`UNKNOWN`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The known subsystems built around this product, in database order.
    #[must_use]
    pub fn subsystems(&self) -> &[Arc<Product>] {
        &self.subsystems
    }
}

/// A PCI device class, e.g. `03` "Display controller".
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Class {
    id: String,
    name: String,
    subclasses: Vec<Arc<Subclass>>,
}

impl Class {
    pub(crate) fn unknown(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: UNKNOWN.to_string(),
            subclasses: Vec::new(),
        }
    }

    /// The two-digit lower-case hex class code.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The class name, or [`UNKNOWN`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The subclasses of the class, in database order.
    #[must_use]
    pub fn subclasses(&self) -> &[Arc<Subclass>] {
        &self.subclasses
    }
}

/// A subclass of a PCI device class, e.g. `00` "VGA compatible controller".
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Subclass {
    id: String,
    name: String,
    programming_interfaces: Vec<Arc<ProgrammingInterface>>,
}

impl Subclass {
    pub(crate) fn unknown(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: UNKNOWN.to_string(),
            programming_interfaces: Vec::new(),
        }
    }

    /// The two-digit lower-case hex subclass code.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The subclass name, or [`UNKNOWN`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The programming interfaces of the subclass, in database order.
    #[must_use]
    pub fn programming_interfaces(&self) -> &[Arc<ProgrammingInterface>] {
        &self.programming_interfaces
    }
}

/// A programming interface of a PCI device subclass, e.g. `01` "AHCI 1.0".
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProgrammingInterface {
    id: String,
    name: String,
}

impl ProgrammingInterface {
    pub(crate) fn unknown(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: UNKNOWN.to_string(),
        }
    }

    /// The two-digit lower-case hex programming interface code.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The programming interface name, or [`UNKNOWN`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The PCI ID database (`pci.ids`), which gives names to vendor, product and class codes.
///
/// Immutable once loaded. Records are reference-counted so that resolved devices can share them
/// with the database and with each other.
///
/// # Example
///
/// ```
/// use hardware_inventory::PciDatabase;
///
/// let database = PciDatabase::parse(
///     "8086  Intel Corporation\n\t1c02  6 Series/C200 Series Chipset Family SATA AHCI Controller\n",
/// );
///
/// assert_eq!(database.vendor("8086").unwrap().name(), "Intel Corporation");
/// assert_eq!(database.product("8086", "1c02").unwrap().subsystems().len(), 0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct PciDatabase {
    vendors: HashMap<String, Arc<Vendor>>,
    products: HashMap<String, Arc<Product>>,
    classes: HashMap<String, Arc<Class>>,
}

impl PciDatabase {
    /// Loads the PCI ID database of the host described by `options`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SourceUnavailable`][crate::Error::SourceUnavailable] if no database file
    /// can be read.
    pub fn load(options: &Options) -> crate::Result<Self> {
        Self::from_filesystem(&options.filesystem())
    }

    pub(crate) fn from_filesystem(fs: &FilesystemFacade) -> crate::Result<Self> {
        let contents = fs.get_pci_ids_contents()?;

        let database = Self::parse(&contents);

        tracing::debug!(
            vendors = database.vendors.len(),
            products = database.products.len(),
            classes = database.classes.len(),
            "loaded PCI ID database"
        );

        Ok(database)
    }

    /// Parses the text of a `pci.ids` file.
    ///
    /// Comments, blank lines and lines that do not fit the format are skipped.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut parser = Parser::default();

        for line in text.lines() {
            parser.line(line);
        }

        parser.finish()
    }

    /// Looks up a vendor by its lower-case hex ID.
    #[must_use]
    pub fn vendor(&self, id: &str) -> Option<&Arc<Vendor>> {
        self.vendors.get(id)
    }

    /// Looks up a product by the lower-case hex IDs of its vendor and itself.
    #[must_use]
    pub fn product(&self, vendor_id: &str, product_id: &str) -> Option<&Arc<Product>> {
        self.products.get(&product_key(vendor_id, product_id))
    }

    /// Looks up a device class by its lower-case hex code.
    #[must_use]
    pub fn class(&self, id: &str) -> Option<&Arc<Class>> {
        self.classes.get(id)
    }

    /// All vendors, in no particular order.
    pub fn vendors(&self) -> impl Iterator<Item = &Arc<Vendor>> {
        self.vendors.values()
    }

    /// All device classes, in no particular order.
    pub fn classes(&self) -> impl Iterator<Item = &Arc<Class>> {
        self.classes.values()
    }
}

fn product_key(vendor_id: &str, product_id: &str) -> String {
    format!("{vendor_id}{product_id}")
}

/// Which top-level section the parser is in, which decides what indented lines belong to.
#[derive(Debug, Default)]
enum Section {
    #[default]
    None,
    Vendor(VendorEntry),
    Class(ClassEntry),
}

#[derive(Debug)]
struct VendorEntry {
    id: String,
    name: String,
    products: Vec<ProductEntry>,
    // Whether indented subsystem lines have a product to attach to.
    product_open: bool,
}

#[derive(Debug)]
struct ProductEntry {
    id: String,
    name: String,
    subsystems: Vec<Product>,
}

#[derive(Debug)]
struct ClassEntry {
    id: String,
    name: String,
    subclasses: Vec<SubclassEntry>,
    subclass_open: bool,
}

#[derive(Debug)]
struct SubclassEntry {
    id: String,
    name: String,
    programming_interfaces: Vec<ProgrammingInterface>,
}

/// Line-by-line `pci.ids` parser.
///
/// Example content:
///
/// ```text
/// 8086  Intel Corporation
/// <TAB>1c02  6 Series/C200 Series Chipset Family SATA AHCI Controller
/// <TAB><TAB>1028 04a9  Latitude E6520
/// C 01  Mass storage controller
/// <TAB>06  SATA controller
/// <TAB><TAB>01  AHCI 1.0
/// ```
#[derive(Debug, Default)]
struct Parser {
    section: Section,
    database: PciDatabase,
}

impl Parser {
    fn line(&mut self, line: &str) {
        let line = line.trim_end();

        if line.trim_start().is_empty() || line.trim_start().starts_with('#') {
            return;
        }

        let content = line.trim_start_matches('\t');
        let depth = line.len().saturating_sub(content.len());

        if depth == 0 {
            self.top_level(content);
            return;
        }

        match (depth, &mut self.section) {
            (1, Section::Vendor(vendor)) => {
                let product = split_id_name(content, 4).map(|(id, name)| ProductEntry {
                    id,
                    name,
                    subsystems: Vec::new(),
                });

                vendor.product_open = product.is_some();
                vendor.products.extend(product);
            }
            (2, Section::Vendor(vendor)) if vendor.product_open => {
                let subsystem = split_subsystem(content);

                if let (Some(product), Some((subvendor_id, id, name))) =
                    (vendor.products.last_mut(), subsystem)
                {
                    product.subsystems.push(Product {
                        vendor_id: subvendor_id,
                        id,
                        name,
                        subsystems: Vec::new(),
                    });
                }
            }
            (1, Section::Class(class)) => {
                let subclass = split_id_name(content, 2).map(|(id, name)| SubclassEntry {
                    id,
                    name,
                    programming_interfaces: Vec::new(),
                });

                class.subclass_open = subclass.is_some();
                class.subclasses.extend(subclass);
            }
            (2, Section::Class(class)) if class.subclass_open => {
                if let (Some(subclass), Some((id, name))) =
                    (class.subclasses.last_mut(), split_id_name(content, 2))
                {
                    subclass
                        .programming_interfaces
                        .push(ProgrammingInterface { id, name });
                }
            }
            _ => {}
        }
    }

    fn top_level(&mut self, content: &str) {
        self.close_section();

        self.section = if let Some(class) = content.strip_prefix("C ") {
            split_id_name(class, 2).map_or(Section::None, |(id, name)| {
                Section::Class(ClassEntry {
                    id,
                    name,
                    subclasses: Vec::new(),
                    subclass_open: false,
                })
            })
        } else {
            split_id_name(content, 4).map_or(Section::None, |(id, name)| {
                Section::Vendor(VendorEntry {
                    id,
                    name,
                    products: Vec::new(),
                    product_open: false,
                })
            })
        };
    }

    /// Freezes the section being built into the database.
    fn close_section(&mut self) {
        match std::mem::take(&mut self.section) {
            Section::None => {}
            Section::Vendor(vendor) => self.add_vendor(vendor),
            Section::Class(class) => self.add_class(class),
        }
    }

    fn add_vendor(&mut self, vendor: VendorEntry) {
        let products: Vec<Arc<Product>> = vendor
            .products
            .into_iter()
            .map(|product| {
                Arc::new(Product {
                    vendor_id: vendor.id.clone(),
                    id: product.id,
                    name: product.name,
                    subsystems: product.subsystems.into_iter().map(Arc::new).collect(),
                })
            })
            .collect();

        for product in &products {
            self.database
                .products
                .insert(product_key(&vendor.id, &product.id), Arc::clone(product));
        }

        self.database.vendors.insert(
            vendor.id.clone(),
            Arc::new(Vendor {
                id: vendor.id,
                name: vendor.name,
                products,
            }),
        );
    }

    fn add_class(&mut self, class: ClassEntry) {
        let subclasses = class
            .subclasses
            .into_iter()
            .map(|subclass| {
                Arc::new(Subclass {
                    id: subclass.id,
                    name: subclass.name,
                    programming_interfaces: subclass
                        .programming_interfaces
                        .into_iter()
                        .map(Arc::new)
                        .collect(),
                })
            })
            .collect();

        self.database.classes.insert(
            class.id.clone(),
            Arc::new(Class {
                id: class.id,
                name: class.name,
                subclasses,
            }),
        );
    }

    fn finish(mut self) -> PciDatabase {
        self.close_section();
        self.database
    }
}

fn is_hex_id(value: &str, width: usize) -> bool {
    value.len() == width && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Splits `"1c02  Some Name"` into a lower-case ID of the expected width and the name.
fn split_id_name(content: &str, width: usize) -> Option<(String, String)> {
    let (id, name) = content.split_once(char::is_whitespace)?;
    let name = name.trim();

    if !is_hex_id(id, width) || name.is_empty() {
        return None;
    }

    Some((id.to_ascii_lowercase(), name.to_string()))
}

/// Splits `"1028 04a9  Some Name"` into subsystem vendor ID, subsystem product ID and name.
fn split_subsystem(content: &str) -> Option<(String, String, String)> {
    let (vendor_id, rest) = content.split_once(char::is_whitespace)?;

    if !is_hex_id(vendor_id, 4) {
        return None;
    }

    let (id, name) = split_id_name(rest.trim_start(), 4)?;

    Some((vendor_id.to_ascii_lowercase(), id, name))
}
