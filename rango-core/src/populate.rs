/// Seed data for a fresh directory
///
/// Running the seed twice is harmless: existing categories and pages are
/// reused, and counters are only ever raised to the seeded values.

use crate::{directory::Directory, Error, Result};
use tracing::info;

struct SeedPage {
    title: &'static str,
    url: &'static str,
    views: u64,
}

struct SeedCategory {
    name: &'static str,
    views: u64,
    likes: u64,
    pages: &'static [SeedPage],
}

const SEED: &[SeedCategory] = &[
    SeedCategory {
        name: "Python",
        views: 128,
        likes: 64,
        pages: &[
            SeedPage {
                title: "Official Python Tutorial",
                url: "http://docs.python.org/3/tutorial/",
                views: 48,
            },
            SeedPage {
                title: "How to Think like a Computer Scientist",
                url: "http://www.greenteapress.com/thinkpython/",
                views: 31,
            },
            SeedPage {
                title: "Learn Python in 10 Minutes",
                url: "http://www.korokithakis.net/tutorials/python/",
                views: 17,
            },
        ],
    },
    SeedCategory {
        name: "Django",
        views: 64,
        likes: 32,
        pages: &[
            SeedPage {
                title: "Official Django Tutorial",
                url: "https://docs.djangoproject.com/en/stable/intro/tutorial01/",
                views: 40,
            },
            SeedPage {
                title: "Django Rocks",
                url: "http://www.djangorocks.com/",
                views: 12,
            },
            SeedPage {
                title: "How to Tango with Django",
                url: "http://www.tangowithdjango.com/",
                views: 25,
            },
        ],
    },
    SeedCategory {
        name: "Other Frameworks",
        views: 32,
        likes: 16,
        pages: &[
            SeedPage {
                title: "Bottle",
                url: "http://bottlepy.org/docs/dev/",
                views: 9,
            },
            SeedPage {
                title: "Flask",
                url: "http://flask.pocoo.org",
                views: 14,
            },
        ],
    },
];

/// What a populate run changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulateReport {
    pub categories_added: usize,
    pub pages_added: usize,
}

impl Directory {
    /// Seed the directory with the sample categories and pages
    pub fn populate(&self) -> Result<PopulateReport> {
        let mut report = PopulateReport::default();

        for seed in SEED {
            let category = match self.find_category(seed.name) {
                Ok(category) => category,
                Err(Error::NotFound(_)) => {
                    report.categories_added += 1;
                    self.add_category(seed.name)?
                }
                Err(e) => return Err(e),
            };
            let category = self.raise_category_counters(category.id, seed.views, seed.likes)?;

            let existing = self.pages_for(category.id)?;
            for page_seed in seed.pages {
                let page = match existing.iter().find(|p| p.title == page_seed.title) {
                    Some(page) => page.clone(),
                    None => {
                        report.pages_added += 1;
                        self.add_page(category.id, page_seed.title, page_seed.url)?
                    }
                };
                self.raise_page_views(page.id, page_seed.views)?;
            }
        }

        info!(
            "Populated directory: {} categories and {} pages added",
            report.categories_added, report.pages_added
        );
        Ok(report)
    }
}
