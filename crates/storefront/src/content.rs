//! Fixed marketing copy for the public pages.
//!
//! The site has no CMS; FAQ entries, customer reviews, company stats and
//! contact details are compiled in.

/// A question on the FAQ page.
#[derive(Debug, Clone, Copy)]
pub struct FaqEntry {
    pub question: &'static str,
    pub answer: &'static str,
}

/// A customer review card.
#[derive(Debug, Clone, Copy)]
pub struct Review {
    pub rating: u8,
    pub date: &'static str,
    pub comment: &'static str,
    pub name: &'static str,
    pub initials: &'static str,
    pub location: &'static str,
}

/// A headline number on the about page.
#[derive(Debug, Clone, Copy)]
pub struct Stat {
    pub value: &'static str,
    pub label: &'static str,
}

/// Business contact details shown on the contact page and footer.
#[derive(Debug, Clone, Copy)]
pub struct ContactDetails {
    pub phone: &'static str,
    pub email: &'static str,
    pub location: &'static str,
}

/// Social profile links.
#[derive(Debug, Clone, Copy)]
pub struct SocialLink {
    pub label: &'static str,
    pub url: &'static str,
}

pub const CONTACT: ContactDetails = ContactDetails {
    phone: "+1 (786) 763-7398",
    email: "Msapparels1117@gmail.com",
    location: "Miami Lakes, FL, United States, Florida",
};

pub const SOCIAL: [SocialLink; 2] = [
    SocialLink {
        label: "Facebook",
        url: "https://www.facebook.com/people/MS-Apparels/61574932028343/",
    },
    SocialLink {
        label: "Instagram",
        url: "https://www.instagram.com/",
    },
];

pub const FAQS: [FaqEntry; 10] = [
    FaqEntry {
        question: "How do I place an order?",
        answer: "You can browse our collection, select your preferred sportswear, customize it if needed, and place an order through our website.",
    },
    FaqEntry {
        question: "Can I customize my jerseys and apparel?",
        answer: "Yes! We offer full customization, including team logos, player names, numbers, and colors.",
    },
    FaqEntry {
        question: "Is there a minimum order quantity (MOQ)?",
        answer: "Our MOQ depends on the product type. Please check the product page or contact us for details.",
    },
    FaqEntry {
        question: "Do you offer international shipping?",
        answer: "Yes, we ship worldwide. Shipping costs and delivery times vary based on location.",
    },
    FaqEntry {
        question: "How long does it take to receive my order?",
        answer: "Standard orders take 7-8 days for production and 2 days for delivery, depending on your location.",
    },
    FaqEntry {
        question: "Can I return or exchange a customized product?",
        answer: "Since customized items are made to order, we do not accept returns unless there is a defect or error on our part.",
    },
    FaqEntry {
        question: "What if I receive a damaged or incorrect item?",
        answer: "Please contact us within 2-3 days of receiving your order, and we will assist you in resolving the issue.",
    },
    FaqEntry {
        question: "What payment methods do you accept?",
        answer: "We accept credit/debit cards, PayPal, and other secure payment gateways.",
    },
    FaqEntry {
        question: "Do you offer bulk order discounts?",
        answer: "Yes! Contact us for special pricing on team and bulk orders.",
    },
    FaqEntry {
        question: "Are there any ongoing promotions or discounts?",
        answer: "Check our website or subscribe to our newsletter for the latest deals and offers.",
    },
];

pub const REVIEWS: [Review; 4] = [
    Review {
        rating: 5,
        date: "2023-03-10",
        comment: "This product exceeded my expectations. The quality is exceptional, and the customer service was incredibly helpful. Highly recommend!",
        name: "Michal",
        initials: "MI",
        location: "Los Angeles, CA",
    },
    Review {
        rating: 5,
        date: "2023-02-20",
        comment: "I am very happy with my purchase! The delivery was quick, and the product works exactly as described. Definitely worth the price.",
        name: "Sarah K.",
        initials: "SK",
        location: "New York, NY",
    },
    Review {
        rating: 5,
        date: "2023-01-15",
        comment: "Amazing experience! The product is high-quality and durable. I will definitely be buying again. Customer support is also fantastic.",
        name: "Daniel R.",
        initials: "DR",
        location: "Chicago, IL",
    },
    Review {
        rating: 5,
        date: "2023-03-05",
        comment: "The product is great! It's everything I expected, and I love the customer service. Would recommend it to all my friends.",
        name: "Emily W.",
        initials: "EW",
        location: "San Francisco, CA",
    },
];

pub const STATS: [Stat; 4] = [
    Stat {
        value: "3.5",
        label: "Years Experience",
    },
    Stat {
        value: "23",
        label: "Project Challenge",
    },
    Stat {
        value: "200+",
        label: "Positive Reviews",
    },
    Stat {
        value: "10K",
        label: "Trusted Client",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faq_has_ten_distinct_questions() {
        let mut questions: Vec<_> = FAQS.iter().map(|f| f.question).collect();
        questions.sort_unstable();
        questions.dedup();
        assert_eq!(questions.len(), 10);
    }

    #[test]
    fn test_review_ratings_are_stars() {
        assert!(REVIEWS.iter().all(|r| (1..=5).contains(&r.rating)));
    }
}
