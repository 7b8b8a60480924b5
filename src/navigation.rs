//! This file defines the templates and a convenience function for creating the navigation bar.

use maud::{Markup, html};

use crate::endpoints;

/// Template for a link in the navigation bar.
///
/// It will change appearance if `is_current` is set to
/// `true`. Only one link should be set as active at any one time.
#[derive(Clone)]
struct Link<'a> {
    url: &'a str,
    title: &'a str,
    is_current: bool,
}

impl Link<'_> {
    fn into_html(self) -> Markup {
        let style = if self.is_current {
            "block py-2 px-3 text-white bg-blue-700 rounded-sm lg:bg-transparent
        lg:text-blue-700 lg:p-0 dark:text-white lg:dark:text-blue-500"
        } else {
            "block py-2 px-3 text-gray-900 rounded-sm hover:bg-gray-100
        lg:hover:bg-transparent lg:border-0 lg:hover:text-blue-700 lg:p-0
        dark:text-white lg:dark:hover:text-blue-500 dark:hover:bg-gray-700
        dark:hover:text-white lg:dark:hover:bg-transparent"
        };

        html!(
            a
                href=(self.url)
                class=(style)
                aria-current=[self.is_current.then_some("page")]
            {
                (self.title)
            }
        )
    }
}

/// The export downloads offered in the navigation bar, as (url, title) pairs.
const EXPORT_LINKS: [(&str, &str); 3] = [
    (endpoints::EXPORT_SPREADSHEET, "Spreadsheet (.xlsx)"),
    (endpoints::EXPORT_CSV, "CSV (.csv)"),
    (endpoints::EXPORT_PDF, "PDF (.pdf)"),
];

pub struct NavBar<'a> {
    links: Vec<Link<'a>>,
}

impl NavBar<'_> {
    /// Get the navigation bar.
    ///
    /// If a link matches `active_endpoint`, then that link will be
    /// marked as active and displayed differently in the HTML.
    pub fn new(active_endpoint: &str) -> NavBar<'_> {
        let links = [
            (endpoints::TRANSACTIONS_VIEW, "Transactions"),
            (endpoints::SUMMARY_VIEW, "Summary"),
            (endpoints::SETTINGS_VIEW, "Settings"),
        ]
        .into_iter()
        .map(|(url, title)| Link {
            url,
            title,
            is_current: active_endpoint == url,
        })
        .collect();

        NavBar { links }
    }

    pub fn into_html(self) -> Markup {
        // Template adapted from https://flowbite.com/docs/components/navbar/#default-navbar
        html!(
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div
                    class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a
                        href=(endpoints::ROOT)
                        class="flex items-center space-x-3 rtl:space-x-reverse"
                    {
                        span
                            class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                        {
                            "Pocket Ledger"
                        }
                    }

                    ul
                        class="font-medium flex flex-row items-center space-x-8
                        rtl:space-x-reverse dark:text-white"
                    {
                        @for link in self.links {
                            li { (link.into_html()) }
                        }

                        li
                        {
                            details class="relative"
                            {
                                summary
                                    class="cursor-pointer text-gray-900 hover:text-blue-700
                                    dark:text-white lg:dark:hover:text-blue-500"
                                {
                                    "Export"
                                }

                                ul
                                    class="absolute right-0 mt-2 w-48 rounded border
                                    border-gray-200 bg-white p-2 shadow-xl z-10
                                    dark:border-gray-700 dark:bg-gray-800"
                                {
                                    @for (url, title) in EXPORT_LINKS {
                                        li
                                        {
                                            a
                                                href=(url)
                                                download
                                                class="block rounded px-3 py-2 text-sm
                                                text-gray-700 hover:bg-gray-100
                                                dark:text-gray-200 dark:hover:bg-gray-700"
                                            {
                                                (title)
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        )
    }
}

#[cfg(test)]
mod nav_bar_tests {
    use scraper::{Html, Selector};

    use crate::{endpoints, navigation::NavBar};

    #[test]
    fn set_active_endpoint() {
        let cases = [
            (endpoints::TRANSACTIONS_VIEW, true),
            (endpoints::SUMMARY_VIEW, true),
            (endpoints::SETTINGS_VIEW, true),
            (endpoints::ROOT, false),
            (endpoints::NEW_TRANSACTION_VIEW, false),
            (endpoints::TRANSACTIONS_API, false),
        ];

        for (endpoint, should_be_active) in cases {
            let nav_bar = NavBar::new(endpoint);

            assert_link_active(nav_bar, endpoint, should_be_active);
        }
    }

    #[test]
    fn has_export_links() {
        let html = Html::parse_fragment(&NavBar::new(endpoints::ROOT).into_html().into_string());

        let hrefs: Vec<&str> = html
            .select(&Selector::parse("a[download]").unwrap())
            .filter_map(|link| link.value().attr("href"))
            .collect();

        assert_eq!(
            hrefs,
            vec![
                endpoints::EXPORT_SPREADSHEET,
                endpoints::EXPORT_CSV,
                endpoints::EXPORT_PDF
            ]
        );
    }

    #[track_caller]
    fn assert_link_active(nav_bar: NavBar<'_>, endpoint: &str, should_be_active: bool) {
        for link in nav_bar.links {
            if link.url == endpoint {
                assert_eq!(
                    link.is_current, should_be_active,
                    "want link for {endpoint} to have is_current = {should_be_active}"
                )
            } else {
                assert!(
                    !link.is_current,
                    "want link for {} to be inactive when the current page is {endpoint}",
                    link.url
                )
            }
        }
    }
}
