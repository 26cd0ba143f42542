//! Static lookup tables that turn a classifier output index into a waste label,
//! its organic/inorganic category and human-readable handling instructions.
//!
//! Every mapping is an exhaustive `match`, so adding a label without a category
//! or instructions is a compile error rather than a missing key at runtime.

use std::fmt;

/// Number of classes the deployed classifier emits scores for.
pub const NUM_CLASSES: usize = 9;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("Unknown class index {index} (classifier has {num_classes} classes)")]
    UnknownClassIndex { index: usize, num_classes: usize },
}

/// Language used for the strings returned to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Locale {
    /// English labels, categories and instructions
    #[default]
    En,
    /// Indonesian wire strings, as served by the first deployment
    Id,
}

/// Coarse grouping of a [`WasteLabel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Organic,
    Inorganic,
}

impl Category {
    pub fn name(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::Organic, Locale::En) => "organic",
            (Self::Inorganic, Locale::En) => "inorganic",
            (Self::Organic, Locale::Id) => "organik",
            (Self::Inorganic, Locale::Id) => "anorganik",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name(Locale::En))
    }
}

/// One of the waste materials the classifier recognises, in output-index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WasteLabel {
    Battery,
    Biological,
    Glass,
    Cardboard,
    Paper,
    Metal,
    Clothing,
    Plastic,
    Shoes,
}

impl WasteLabel {
    /// All labels, indexed by classifier output position.
    pub const ALL: [WasteLabel; NUM_CLASSES] = [
        Self::Battery,
        Self::Biological,
        Self::Glass,
        Self::Cardboard,
        Self::Paper,
        Self::Metal,
        Self::Clothing,
        Self::Plastic,
        Self::Shoes,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => match self {
                Self::Battery => "battery",
                Self::Biological => "biological",
                Self::Glass => "glass",
                Self::Cardboard => "cardboard",
                Self::Paper => "paper",
                Self::Metal => "metal",
                Self::Clothing => "clothing",
                Self::Plastic => "plastic",
                Self::Shoes => "shoes",
            },
            Locale::Id => match self {
                Self::Battery => "baterai",
                Self::Biological => "biologis",
                Self::Glass => "gelas",
                Self::Cardboard => "kardus",
                Self::Paper => "kertas",
                Self::Metal => "metal",
                Self::Clothing => "pakaian",
                Self::Plastic => "plastik",
                Self::Shoes => "sepatu",
            },
        }
    }

    pub fn category(self) -> Category {
        match self {
            Self::Biological => Category::Organic,
            Self::Battery
            | Self::Glass
            | Self::Cardboard
            | Self::Paper
            | Self::Metal
            | Self::Clothing
            | Self::Plastic
            | Self::Shoes => Category::Inorganic,
        }
    }

    pub fn instructions(self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => english_instructions(self),
            Locale::Id => indonesian_instructions(self),
        }
    }
}

impl fmt::Display for WasteLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name(Locale::En))
    }
}

/// Maps a classifier output index to its label.
pub fn label_of(class_index: usize) -> Result<WasteLabel, LookupError> {
    WasteLabel::from_index(class_index).ok_or(LookupError::UnknownClassIndex {
        index: class_index,
        num_classes: NUM_CLASSES,
    })
}

pub fn category_of(label: WasteLabel) -> Category {
    label.category()
}

pub fn instructions_of(label: WasteLabel, locale: Locale) -> &'static str {
    label.instructions(locale)
}

fn english_instructions(label: WasteLabel) -> &'static str {
    match label {
        WasteLabel::Battery => "Batteries are hazardous inorganic waste that contain toxic chemicals. Handle them carefully to avoid damaging the environment.
- Collect used batteries in a separate container.
- Do not throw them away with household waste.
- Take them to a collection point or a recycling facility that accepts batteries.",
        WasteLabel::Biological => "Biological or organic waste is the remains of natural materials that can decompose. Examples include food scraps, leaves and garden material.
- Collect organic waste in a dedicated organic bin.
- Organic waste can be composted into natural fertilizer.
- Avoid mixing organic and inorganic waste so composting stays easy.",
        WasteLabel::Glass => "Glass is inorganic waste that can be recycled into new products.
- Clean the glass of any leftover food or drink.
- Separate glass by color if possible.
- Take it to a glass recycling facility or put it in a glass recycling bin.",
        WasteLabel::Cardboard => "Cardboard is inorganic waste made from wood fiber and is easy to recycle.
- Flatten cardboard so it takes up less space.
- Make sure the cardboard is clean and dry.
- Take it to a paper recycling facility or put it in a paper recycling bin.",
        WasteLabel::Paper => "Paper is inorganic waste that can be recycled into new paper products.
- Fold or cut paper so it is easier to process.
- Make sure the paper is clean and dry.
- Take it to a paper recycling facility or put it in a paper recycling bin.",
        WasteLabel::Metal => "Metal is inorganic waste that can be recycled into new metal products.
- Clean the metal of any leftover food or other material.
- Separate metal by type if possible.
- Take it to a metal recycling facility or put it in a metal recycling bin.",
        WasteLabel::Clothing => "Clothing is inorganic waste that can be recycled or reused.
- If the clothes are still wearable, donate them to an orphanage or a charity.
- If they are no longer wearable, take them to a textile recycling facility.
- Separate clothes by fabric type if possible.",
        WasteLabel::Plastic => "Plastic is inorganic waste that is very hard to break down but can be recycled into new products.
- Clean the plastic of any leftover food or other material.
- Separate plastic by type if possible.
- Take it to a plastic recycling facility or put it in a plastic recycling bin.",
        WasteLabel::Shoes => "Shoes are inorganic waste that can be recycled or reused.
- If the shoes are still wearable, donate them to an orphanage or a charity.
- If they are no longer wearable, take them to a textile recycling facility.
- Separate shoes by the material they are made of if possible.",
    }
}

fn indonesian_instructions(label: WasteLabel) -> &'static str {
    match label {
        WasteLabel::Battery => "Baterai adalah sampah anorganik berbahaya yang mengandung bahan kimia beracun. Pengelolaannya harus dilakukan dengan hati-hati untuk menghindari kerusakan lingkungan.
- Kumpulkan baterai bekas di wadah terpisah.
- Jangan membuangnya bersama sampah rumah tangga.
- Bawa ke titik pengumpulan atau fasilitas daur ulang khusus untuk baterai.",
        WasteLabel::Biological => "Sampah biologis atau organik adalah sisa-sisa bahan alami yang dapat terurai. Contohnya termasuk sisa makanan, daun, dan bahan taman.
- Kumpulkan sampah organik di tempat sampah khusus organik.
- Sampah organik bisa dikomposkan untuk menghasilkan pupuk alami.
- Hindari mencampur sampah organik dengan sampah anorganik untuk memudahkan proses pengomposan.",
        WasteLabel::Glass => "Gelas adalah sampah anorganik yang dapat didaur ulang menjadi produk baru.
- Bersihkan gelas dari sisa makanan atau minuman.
- Pisahkan gelas berdasarkan warnanya jika memungkinkan.
- Bawa ke fasilitas daur ulang gelas atau letakkan di tempat sampah daur ulang gelas.",
        WasteLabel::Cardboard => "Kardus adalah sampah anorganik yang terbuat dari serat kayu dan mudah didaur ulang.
- Lipat kardus agar tidak memakan banyak tempat.
- Pastikan kardus dalam keadaan bersih dan kering.
- Bawa ke fasilitas daur ulang kertas atau letakkan di tempat sampah daur ulang kertas.",
        WasteLabel::Paper => "Kertas adalah sampah anorganik yang dapat didaur ulang menjadi produk kertas baru.
- Lipat atau gunting kertas agar lebih mudah diolah.
- Pastikan kertas dalam keadaan bersih dan kering.
- Bawa ke fasilitas daur ulang kertas atau letakkan di tempat sampah daur ulang kertas.",
        WasteLabel::Metal => "Metal adalah sampah anorganik yang dapat didaur ulang menjadi produk metal baru.
- Bersihkan metal dari sisa makanan atau bahan lainnya.
- Pisahkan metal berdasarkan jenisnya jika memungkinkan.
- Bawa ke fasilitas daur ulang metal atau letakkan di tempat sampah daur ulang metal.",
        WasteLabel::Clothing => "Pakaian adalah sampah anorganik yang dapat didaur ulang atau digunakan kembali.
- Jika pakaian masih layak pakai, donasikan ke panti asuhan atau lembaga sosial.
- Jika tidak layak pakai, bawa ke fasilitas daur ulang tekstil.
- Pisahkan pakaian berdasarkan jenis kain jika memungkinkan.",
        WasteLabel::Plastic => "Plastik adalah sampah anorganik yang sangat sulit terurai tetapi dapat didaur ulang menjadi produk baru.
- Bersihkan plastik dari sisa makanan atau bahan lainnya.
- Pisahkan plastik berdasarkan jenisnya jika memungkinkan.
- Bawa ke fasilitas daur ulang plastik atau letakkan di tempat sampah daur ulang plastik.",
        WasteLabel::Shoes => "Sepatu adalah sampah anorganik yang dapat didaur ulang atau digunakan kembali.
- Jika sepatu masih layak pakai, donasikan ke panti asuhan atau lembaga sosial.
- Jika tidak layak pakai, bawa ke fasilitas daur ulang tekstil.
- Pisahkan sepatu berdasarkan bahan pembuatannya jika memungkinkan.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_index_maps_to_a_label() {
        for index in 0..NUM_CLASSES {
            let label = label_of(index).unwrap();
            assert_eq!(label.index(), index);
        }
    }

    #[test]
    fn test_out_of_range_index_is_an_error() {
        assert_eq!(
            label_of(NUM_CLASSES),
            Err(LookupError::UnknownClassIndex { index: 9, num_classes: 9 })
        );
    }

    #[test]
    fn test_only_biological_is_organic() {
        for label in WasteLabel::ALL {
            let expected = if label == WasteLabel::Biological {
                Category::Organic
            } else {
                Category::Inorganic
            };
            assert_eq!(category_of(label), expected, "{}", label);
        }
    }

    #[test]
    fn test_instructions_have_summary_and_three_steps() {
        for locale in [Locale::En, Locale::Id] {
            for label in WasteLabel::ALL {
                let text = instructions_of(label, locale);
                let lines: Vec<&str> = text.lines().collect();
                assert_eq!(lines.len(), 4, "{:?}/{:?}", label, locale);
                assert!(!lines[0].is_empty());
                assert!(lines[1..].iter().all(|l| l.starts_with("- ")));
            }
        }
    }

    #[test]
    fn test_names_are_unique_per_locale() {
        for locale in [Locale::En, Locale::Id] {
            let names: HashSet<_> = WasteLabel::ALL.iter().map(|l| l.name(locale)).collect();
            assert_eq!(names.len(), NUM_CLASSES);
        }
    }

    #[test]
    fn test_indonesian_wire_strings() {
        assert_eq!(WasteLabel::Battery.name(Locale::Id), "baterai");
        assert_eq!(WasteLabel::Shoes.name(Locale::Id), "sepatu");
        assert_eq!(Category::Organic.name(Locale::Id), "organik");
        assert_eq!(Category::Inorganic.name(Locale::Id), "anorganik");
    }
}
